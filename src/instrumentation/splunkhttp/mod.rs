//! Splunk specific instrumentation for actix-web servers.
//!
//! [`SplunkHttp`] traces every request in a server span and returns the trace
//! context to the client in a `Server-Timing` response header, so browser
//! instrumentation can link its spans to the backend trace.
//!
//! # Example
//!
//! ```rust,ignore
//! use splunk_otel::instrumentation::splunkhttp::{with_otel_opts, OtelOption, SplunkHttp};
//!
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(SplunkHttp::new(
//!             "my-service",
//!             [with_otel_opts([OtelOption::filter(|req| req.path() != "/health")])],
//!         ))
//!         .service(hello)
//! })
//! ```
//!
//! # Environment Variables
//!
//! - `SPLUNK_CONTEXT_SERVER_TIMING_ENABLED`: set to `false` to disable the
//!   `Server-Timing` header unless [`with_server_timing`] says otherwise

pub mod config;
pub mod middleware;

pub use config::{with_otel_opts, with_server_timing, Config, HttpOption, OtelOption};
pub use middleware::{trace_parent_header, SplunkHttp, SplunkHttpMiddleware};
