use tracing::warn;

use crate::distro::exporter::{jaeger_endpoint, otlp_metrics_endpoint, otlp_traces_endpoint};
use crate::distro::propagator::{
    parse_propagators, Propagator, DEFAULT_PROPAGATORS, OTEL_PROPAGATORS_KEY,
};
use crate::env::Environment;

pub const OTEL_SERVICE_NAME_KEY: &str = "OTEL_SERVICE_NAME";
pub const OTEL_SERVICE_VERSION_KEY: &str = "OTEL_SERVICE_VERSION";
pub const SPLUNK_ACCESS_TOKEN_KEY: &str = "SPLUNK_ACCESS_TOKEN";
pub const OTEL_TRACES_EXPORTER_KEY: &str = "OTEL_TRACES_EXPORTER";
pub const OTEL_METRICS_EXPORTER_KEY: &str = "OTEL_METRICS_EXPORTER";
pub const LOG_FORMAT_KEY: &str = "LOG_FORMAT";
pub const RUST_LOG_KEY: &str = "RUST_LOG";

/// Service name reported when `OTEL_SERVICE_NAME` is not set
pub const DEFAULT_SERVICE_NAME: &str = "unnamed-rust-service";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty human-readable format with colors (for local dev)
    #[default]
    Pretty,
    /// JSON structured format
    Json,
}

/// Exporter used for spans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracesExporter {
    /// OTLP over gRPC
    #[default]
    Otlp,
    /// Legacy Jaeger Thrift over HTTP to the Splunk ingest
    JaegerThriftSplunk,
    /// Traces are not exported
    None,
}

impl TracesExporter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otlp => "otlp",
            Self::JaegerThriftSplunk => "jaeger-thrift-splunk",
            Self::None => "none",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "otlp" => Self::Otlp,
            "jaeger-thrift-splunk" => Self::JaegerThriftSplunk,
            "none" => Self::None,
            other => {
                warn!(exporter = other, "invalid traces exporter, using otlp");
                Self::Otlp
            }
        }
    }
}

/// Exporter used for metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricsExporter {
    /// OTLP over gRPC
    #[default]
    Otlp,
    /// Metrics are not exported
    None,
}

impl MetricsExporter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otlp => "otlp",
            Self::None => "none",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "otlp" => Self::Otlp,
            "none" => Self::None,
            other => {
                warn!(exporter = other, "invalid metrics exporter, using otlp");
                Self::Otlp
            }
        }
    }
}

/// Distribution configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub access_token: Option<String>,
    pub traces_exporter: TracesExporter,
    pub metrics_exporter: MetricsExporter,
    /// `None` lets the SDK pick its own endpoint
    pub traces_endpoint: Option<String>,
    /// `None` lets the SDK pick its own endpoint
    pub metrics_endpoint: Option<String>,
    pub jaeger_endpoint: Option<String>,
    pub propagators: Vec<Propagator>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl DistroConfig {
    /// Create config from environment variables
    pub fn from_env(env: &impl Environment) -> Self {
        let service_name = match env.non_empty(OTEL_SERVICE_NAME_KEY) {
            Some(name) => name,
            None => {
                warn!(
                    "service name is not set, your service is unnamed and will be difficult \
                     to identify; set it using the {} environment variable",
                    OTEL_SERVICE_NAME_KEY
                );
                DEFAULT_SERVICE_NAME.to_string()
            }
        };

        let log_format = match env.var(LOG_FORMAT_KEY).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let propagators = env
            .non_empty(OTEL_PROPAGATORS_KEY)
            .unwrap_or_else(|| DEFAULT_PROPAGATORS.to_string());

        Self {
            service_name,
            service_version: env.non_empty(OTEL_SERVICE_VERSION_KEY),
            access_token: env.non_empty(SPLUNK_ACCESS_TOKEN_KEY),
            traces_exporter: env
                .non_empty(OTEL_TRACES_EXPORTER_KEY)
                .map(|v| TracesExporter::parse(&v))
                .unwrap_or_default(),
            metrics_exporter: env
                .non_empty(OTEL_METRICS_EXPORTER_KEY)
                .map(|v| MetricsExporter::parse(&v))
                .unwrap_or_default(),
            traces_endpoint: non_empty(otlp_traces_endpoint(env)),
            metrics_endpoint: non_empty(otlp_metrics_endpoint(env)),
            jaeger_endpoint: non_empty(jaeger_endpoint(env)),
            propagators: parse_propagators(&propagators),
            log_level: env.non_empty(RUST_LOG_KEY).unwrap_or_else(|| "info".to_string()),
            log_format,
        }
    }

    /// Create a new config with explicit values and no exporter endpoints
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: None,
            access_token: None,
            traces_exporter: TracesExporter::Otlp,
            metrics_exporter: MetricsExporter::Otlp,
            traces_endpoint: None,
            metrics_endpoint: None,
            jaeger_endpoint: None,
            propagators: vec![Propagator::TraceContext, Propagator::Baggage],
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_traces_exporter(mut self, exporter: TracesExporter) -> Self {
        self.traces_exporter = exporter;
        self
    }

    pub fn with_metrics_exporter(mut self, exporter: MetricsExporter) -> Self {
        self.metrics_exporter = exporter;
        self
    }

    /// Set the OTLP endpoint for both traces and metrics
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.traces_endpoint = Some(endpoint.clone());
        self.metrics_endpoint = Some(endpoint);
        self
    }

    pub fn with_traces_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.traces_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_metrics_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metrics_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_propagators(mut self, propagators: Vec<Propagator>) -> Self {
        self.propagators = propagators;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
