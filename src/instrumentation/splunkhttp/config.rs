use std::fmt;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;

use crate::env::{Environment, ProcessEnv};

/// Adds the `Server-Timing` header to HTTP responses when not `false`
pub const SERVER_TIMING_ENABLED_KEY: &str = "SPLUNK_CONTEXT_SERVER_TIMING_ENABLED";

/// Returns `false` for requests that should not be traced
pub type RequestFilter = Arc<dyn Fn(&ServiceRequest) -> bool + Send + Sync>;

/// Names the server span from the operation name and the request
pub type SpanNameFormatter = Arc<dyn Fn(&str, &ServiceRequest) -> String + Send + Sync>;

/// Options of the underlying server span instrumentation
#[derive(Clone)]
pub enum OtelOption {
    /// Skip instrumentation when any filter returns `false`
    Filter(RequestFilter),
    /// Replace the default span name (the operation name)
    SpanNameFormatter(SpanNameFormatter),
    /// Link to an incoming span context instead of using it as the parent
    PublicEndpoint,
}

impl OtelOption {
    pub fn filter<F>(f: F) -> Self
    where
        F: Fn(&ServiceRequest) -> bool + Send + Sync + 'static,
    {
        Self::Filter(Arc::new(f))
    }

    pub fn span_name_formatter<F>(f: F) -> Self
    where
        F: Fn(&str, &ServiceRequest) -> String + Send + Sync + 'static,
    {
        Self::SpanNameFormatter(Arc::new(f))
    }
}

impl fmt::Debug for OtelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(_) => f.write_str("Filter(..)"),
            Self::SpanNameFormatter(_) => f.write_str("SpanNameFormatter(..)"),
            Self::PublicEndpoint => f.write_str("PublicEndpoint"),
        }
    }
}

/// Option applied to a [`Config`]
#[derive(Debug, Clone)]
pub enum HttpOption {
    OtelOpts(Vec<OtelOption>),
    ServerTiming(bool),
}

impl HttpOption {
    fn apply(self, config: &mut Config) {
        match self {
            Self::OtelOpts(opts) => config.otel_opts = opts,
            Self::ServerTiming(enabled) => config.server_timing_enabled = enabled,
        }
    }
}

/// Pass options to the underlying span instrumentation
pub fn with_otel_opts(opts: impl IntoIterator<Item = OtelOption>) -> HttpOption {
    HttpOption::OtelOpts(opts.into_iter().collect())
}

/// Enable or disable the `Server-Timing` response header.
///
/// The header is enabled by default. `SPLUNK_CONTEXT_SERVER_TIMING_ENABLED`
/// can be set to `false` to disable it; this option takes precedence over the
/// environment variable.
pub fn with_server_timing(enabled: bool) -> HttpOption {
    HttpOption::ServerTiming(enabled)
}

/// HTTP instrumentation configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub otel_opts: Vec<OtelOption>,
    pub server_timing_enabled: bool,
}

impl Config {
    /// Create a config from the process environment and apply `opts` in order
    pub fn new(opts: impl IntoIterator<Item = HttpOption>) -> Self {
        Self::with_env(&ProcessEnv, opts)
    }

    /// Create a config from `env` and apply `opts` in order
    pub fn with_env(env: &impl Environment, opts: impl IntoIterator<Item = HttpOption>) -> Self {
        let server_timing_enabled = !env
            .var(SERVER_TIMING_ENABLED_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        let mut config = Self {
            otel_opts: Vec::new(),
            server_timing_enabled,
        };
        for opt in opts {
            opt.apply(&mut config);
        }
        config
    }

    /// Whether every configured filter accepts `req`
    pub fn should_trace(&self, req: &ServiceRequest) -> bool {
        self.otel_opts.iter().all(|opt| match opt {
            OtelOption::Filter(filter) => filter(req),
            _ => true,
        })
    }

    /// Span name for `req`; the last formatter wins
    pub fn span_name(&self, operation: &str, req: &ServiceRequest) -> String {
        self.otel_opts
            .iter()
            .rev()
            .find_map(|opt| match opt {
                OtelOption::SpanNameFormatter(format) => Some(format(operation, req)),
                _ => None,
            })
            .unwrap_or_else(|| operation.to_string())
    }

    /// Whether an incoming span context is linked instead of used as the parent
    pub fn public_endpoint(&self) -> bool {
        self.otel_opts
            .iter()
            .any(|opt| matches!(opt, OtelOption::PublicEndpoint))
    }
}
