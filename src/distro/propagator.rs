use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use tracing::warn;

pub const OTEL_PROPAGATORS_KEY: &str = "OTEL_PROPAGATORS";

/// Propagators used when `OTEL_PROPAGATORS` is not set.
pub const DEFAULT_PROPAGATORS: &str = "tracecontext,baggage";

/// Supported context propagation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagator {
    /// W3C Trace Context
    TraceContext,
    /// W3C Baggage
    Baggage,
}

impl Propagator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TraceContext => "tracecontext",
            Self::Baggage => "baggage",
        }
    }

    fn build(self) -> Box<dyn TextMapPropagator + Send + Sync> {
        match self {
            Self::TraceContext => Box::new(TraceContextPropagator::new()),
            Self::Baggage => Box::new(BaggagePropagator::new()),
        }
    }
}

/// Parse a comma separated `OTEL_PROPAGATORS` value.
///
/// `none` disables propagation entirely. Unknown names are skipped with a warning.
pub fn parse_propagators(value: &str) -> Vec<Propagator> {
    let mut propagators = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let propagator = match name.to_ascii_lowercase().as_str() {
            "tracecontext" => Propagator::TraceContext,
            "baggage" => Propagator::Baggage,
            "none" => return Vec::new(),
            other => {
                warn!(propagator = other, "unsupported propagator, skipping");
                continue;
            }
        };
        if !propagators.contains(&propagator) {
            propagators.push(propagator);
        }
    }
    propagators
}

/// Build the composite propagator installed as the global text map propagator
pub fn build_propagator(propagators: &[Propagator]) -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(propagators.iter().map(|p| p.build()).collect())
}
