use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::{info, warn};

use crate::distro::config::DistroConfig;
use crate::distro::error::TelemetryError;
use crate::distro::propagator::build_propagator;
use crate::distro::provider::{build_meter_provider, build_tracer_provider};
use crate::distro::trace::init_subscriber;
use crate::env::ProcessEnv;

/// Handle to the installed providers.
///
/// Call [`Sdk::shutdown`] before the process exits so buffered telemetry is
/// exported.
#[derive(Debug)]
pub struct Sdk {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl Sdk {
    pub fn tracer_provider(&self) -> Option<&SdkTracerProvider> {
        self.tracer_provider.as_ref()
    }

    pub fn meter_provider(&self) -> Option<&SdkMeterProvider> {
        self.meter_provider.as_ref()
    }

    /// Shut down every provider, returning the first failure
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        let mut first_error = None;

        if let Some(provider) = &self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "failed to shut down tracer provider");
                first_error.get_or_insert(TelemetryError::from(e));
            }
        }

        if let Some(provider) = &self.meter_provider {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "failed to shut down meter provider");
                first_error.get_or_insert(TelemetryError::from(e));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Build the providers for `config` and install them globally.
///
/// Must be called from within a Tokio runtime.
pub fn run_with_config(config: &DistroConfig) -> Result<Sdk, TelemetryError> {
    let tracer_provider = build_tracer_provider(config)?;
    let meter_provider = build_meter_provider(config)?;

    opentelemetry::global::set_text_map_propagator(build_propagator(&config.propagators));

    if let Some(provider) = &tracer_provider {
        opentelemetry::global::set_tracer_provider(provider.clone());
    }
    if let Some(provider) = &meter_provider {
        opentelemetry::global::set_meter_provider(provider.clone());
    }

    info!(
        service_name = %config.service_name,
        traces_exporter = config.traces_exporter.as_str(),
        metrics_exporter = config.metrics_exporter.as_str(),
        "OpenTelemetry distribution started"
    );

    Ok(Sdk {
        tracer_provider,
        meter_provider,
    })
}

/// Build and install the providers configured by the process environment
pub fn run() -> Result<Sdk, TelemetryError> {
    run_with_config(&DistroConfig::from_env(&ProcessEnv))
}

/// Like [`run_with_config`], and also install the global tracing subscriber
pub fn init_with_config(config: &DistroConfig) -> Result<Sdk, TelemetryError> {
    let sdk = run_with_config(config)?;
    init_subscriber(sdk.tracer_provider(), config)?;
    Ok(sdk)
}

/// Initialize the distribution and logging from the process environment
pub fn init() -> Result<Sdk, TelemetryError> {
    init_with_config(&DistroConfig::from_env(&ProcessEnv))
}
