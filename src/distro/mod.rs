//! Splunk distribution of OpenTelemetry.
//!
//! Configures trace and metric export from environment variables, deriving
//! ingest endpoints from the Splunk realm when no endpoint is given.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! // Install providers, propagators and the tracing subscriber
//! let sdk = splunk_otel::distro::init()?;
//!
//! // ...
//!
//! sdk.shutdown()?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use splunk_otel::distro::{DistroConfig, LogFormat};
//!
//! let config = DistroConfig::new("my-service")
//!     .with_access_token("token")
//!     .with_endpoint("http://collector:4317")
//!     .with_log_format(LogFormat::Json);
//!
//! let sdk = splunk_otel::distro::run_with_config(&config)?;
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SPLUNK_REALM` | Realm used to derive ingest endpoints | - |
//! | `SPLUNK_ACCESS_TOKEN` | Access token sent with exports | - |
//! | `OTEL_SERVICE_NAME` | Service name | `unnamed-rust-service` |
//! | `OTEL_SERVICE_VERSION` | Service version | - |
//! | `OTEL_TRACES_EXPORTER` | `otlp`, `jaeger-thrift-splunk` or `none` | `otlp` |
//! | `OTEL_METRICS_EXPORTER` | `otlp` or `none` | `otlp` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP endpoint, disables realm endpoints | - |
//! | `OTEL_EXPORTER_OTLP_TRACES_ENDPOINT` | OTLP traces endpoint | realm |
//! | `OTEL_EXPORTER_OTLP_METRICS_ENDPOINT` | OTLP metrics endpoint | realm |
//! | `OTEL_EXPORTER_JAEGER_ENDPOINT` | Jaeger endpoint | realm |
//! | `OTEL_PROPAGATORS` | Comma separated propagators | `tracecontext,baggage` |
//! | `RUST_LOG` | Log level filter | `info` |
//! | `LOG_FORMAT` | `pretty` or `json` | `pretty` |
//!
//! # Module Structure
//!
//! - [`api`]: Initialization functions and the [`Sdk`] handle
//! - [`config`]: Configuration types
//! - [`exporter`]: Exporter endpoint resolution
//! - [`propagator`]: Context propagators
//! - [`provider`]: Tracer and meter providers
//! - [`error`]: Error types

pub mod api;
pub mod config;
pub mod error;
pub mod exporter;
pub mod propagator;
pub mod provider;
pub mod resource;
pub mod trace;

pub use api::{init, init_with_config, run, run_with_config, Sdk};
pub use config::{DistroConfig, LogFormat, MetricsExporter, TracesExporter};
pub use error::TelemetryError;
pub use exporter::{jaeger_endpoint, otlp_metrics_endpoint, otlp_traces_endpoint};
pub use propagator::Propagator;
