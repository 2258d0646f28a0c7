use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Exporter error: {0}")]
    Exporter(String),
    #[error("Initialization error: {0}")]
    Init(String),
    #[error("Shutdown error: {0}")]
    Shutdown(String),
    #[error("Unsupported exporter: {0}")]
    Unsupported(String),
}

impl From<opentelemetry_otlp::ExporterBuildError> for TelemetryError {
    fn from(err: opentelemetry_otlp::ExporterBuildError) -> Self {
        Self::Exporter(err.to_string())
    }
}

impl From<opentelemetry_sdk::error::OTelSdkError> for TelemetryError {
    fn from(err: opentelemetry_sdk::error::OTelSdkError) -> Self {
        Self::Shutdown(err.to_string())
    }
}
