//! Splunk distribution of OpenTelemetry for Rust.
//!
//! - [`distro`]: exporter, propagator and subscriber setup driven by
//!   `SPLUNK_*` and `OTEL_*` environment variables
//! - [`instrumentation`]: actix-web server instrumentation
//! - [`env`]: environment lookups shared by both

pub mod distro;
pub mod env;
pub mod instrumentation;
