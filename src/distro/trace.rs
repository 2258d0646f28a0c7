use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::distro::config::{DistroConfig, LogFormat};
use crate::distro::error::TelemetryError;

/// Build the OpenTelemetry tracing layer
pub fn build_otel_layer<S>(
    provider: &SdkTracerProvider,
    service_name: &str,
) -> OpenTelemetryLayer<S, opentelemetry_sdk::trace::Tracer>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let tracer = provider.tracer(service_name.to_string());
    tracing_opentelemetry::layer().with_tracer(tracer)
}

/// Build the JSON fmt layer for structured logging
pub fn build_json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_ansi(false)
}

/// Build the pretty fmt layer for human-readable output (local dev)
pub fn build_pretty_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
}

/// Build the env filter from config, falling back to `info` on an invalid directive
pub fn build_filter(config: &DistroConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber with all layers
pub fn init_subscriber(
    provider: Option<&SdkTracerProvider>,
    config: &DistroConfig,
) -> Result<(), TelemetryError> {
    let otel_layer = provider.map(|p| build_otel_layer(p, &config.service_name));
    let filter = build_filter(config);

    let result = match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(otel_layer)
            .with(build_pretty_layer())
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(otel_layer)
            .with(build_json_layer())
            .try_init(),
    };

    result.map_err(|e| TelemetryError::Init(e.to_string()))
}
