//! Instrumentation for HTTP servers.

pub mod splunkhttp;
