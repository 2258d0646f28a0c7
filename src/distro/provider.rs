//! Tracer and meter providers exporting over OTLP/gRPC.

use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::transport::ClientTlsConfig;
use tracing::info;

use crate::distro::config::{DistroConfig, MetricsExporter, TracesExporter};
use crate::distro::error::TelemetryError;
use crate::distro::resource::build_resource;

/// gRPC metadata key carrying the Splunk access token
pub const ACCESS_TOKEN_HEADER: &str = "x-sf-token";

/// Prefix endpoints without a scheme (`host:port`) with `https://`
pub fn grpc_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

/// Metadata sent with every export request
pub fn export_metadata(config: &DistroConfig) -> Result<MetadataMap, TelemetryError> {
    let mut metadata = MetadataMap::new();
    if let Some(token) = &config.access_token {
        metadata.insert(
            ACCESS_TOKEN_HEADER,
            MetadataValue::try_from(token.as_str())
                .map_err(|e| TelemetryError::Config(format!("Invalid access token: {}", e)))?,
        );
    }
    Ok(metadata)
}

/// Build the tracer provider, or `None` when traces are not exported
pub fn build_tracer_provider(
    config: &DistroConfig,
) -> Result<Option<SdkTracerProvider>, TelemetryError> {
    match config.traces_exporter {
        TracesExporter::None => return Ok(None),
        TracesExporter::JaegerThriftSplunk => {
            return Err(TelemetryError::Unsupported(format!(
                "{} (endpoint {})",
                TracesExporter::JaegerThriftSplunk.as_str(),
                config.jaeger_endpoint.as_deref().unwrap_or("unset")
            )))
        }
        TracesExporter::Otlp => {}
    }

    let mut builder = SpanExporter::builder()
        .with_tonic()
        .with_metadata(export_metadata(config)?);

    if let Some(endpoint) = &config.traces_endpoint {
        let endpoint = grpc_endpoint(endpoint);
        info!(endpoint = %endpoint, "building OTLP span exporter");
        if endpoint.starts_with("https://") {
            builder = builder.with_tls_config(ClientTlsConfig::new().with_native_roots());
        }
        builder = builder.with_endpoint(endpoint);
    } else {
        info!("building OTLP span exporter with SDK default endpoint");
    }

    let exporter = builder.build()?;

    Ok(Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(build_resource(config))
            .build(),
    ))
}

/// Build the meter provider, or `None` when metrics are not exported
pub fn build_meter_provider(
    config: &DistroConfig,
) -> Result<Option<SdkMeterProvider>, TelemetryError> {
    if config.metrics_exporter == MetricsExporter::None {
        return Ok(None);
    }

    let mut builder = MetricExporter::builder()
        .with_tonic()
        .with_metadata(export_metadata(config)?);

    if let Some(endpoint) = &config.metrics_endpoint {
        let endpoint = grpc_endpoint(endpoint);
        info!(endpoint = %endpoint, "building OTLP metric exporter");
        if endpoint.starts_with("https://") {
            builder = builder.with_tls_config(ClientTlsConfig::new().with_native_roots());
        }
        builder = builder.with_endpoint(endpoint);
    } else {
        info!("building OTLP metric exporter with SDK default endpoint");
    }

    let exporter = builder.build()?;

    Ok(Some(
        SdkMeterProvider::builder()
            .with_periodic_exporter(exporter)
            .with_resource(build_resource(config))
            .build(),
    ))
}
