//! Exporter endpoint resolution.
//!
//! Endpoints are derived from `SPLUNK_REALM` unless an exporter endpoint
//! variable is set. An empty result means the exporter should fall back to
//! the SDK default.

use crate::env::Environment;

pub const SPLUNK_REALM_KEY: &str = "SPLUNK_REALM";
pub const OTEL_EXPORTER_OTLP_ENDPOINT_KEY: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const OTEL_EXPORTER_OTLP_TRACES_ENDPOINT_KEY: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";
pub const OTEL_EXPORTER_OTLP_METRICS_ENDPOINT_KEY: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";
pub const OTEL_EXPORTER_JAEGER_ENDPOINT_KEY: &str = "OTEL_EXPORTER_JAEGER_ENDPOINT";

/// Realm value that disables realm-based endpoints.
pub const NONE_REALM: &str = "none";

/// Jaeger endpoint used when no realm is configured.
pub const DEFAULT_JAEGER_ENDPOINT: &str = "http://127.0.0.1:9080/v1/trace";

/// OTLP ingest endpoint for `realm` (`ingest.<realm>.signalfx.com:443`).
pub fn otlp_realm_endpoint(realm: &str) -> String {
    format!("ingest.{realm}.signalfx.com:443")
}

/// Jaeger ingest endpoint for `realm` (`https://ingest.<realm>.signalfx.com/v2/trace`).
pub fn jaeger_realm_endpoint(realm: &str) -> String {
    format!("https://ingest.{realm}.signalfx.com/v2/trace")
}

/// Endpoint for the OTLP traces exporter.
pub fn otlp_traces_endpoint(env: &impl Environment) -> String {
    otlp_signal_endpoint(env, OTEL_EXPORTER_OTLP_TRACES_ENDPOINT_KEY)
}

/// Endpoint for the OTLP metrics exporter.
pub fn otlp_metrics_endpoint(env: &impl Environment) -> String {
    otlp_signal_endpoint(env, OTEL_EXPORTER_OTLP_METRICS_ENDPOINT_KEY)
}

/// Endpoint for the legacy Jaeger exporter.
///
/// Returns an empty string when `OTEL_EXPORTER_JAEGER_ENDPOINT` is set, and
/// [`DEFAULT_JAEGER_ENDPOINT`] when no realm applies.
pub fn jaeger_endpoint(env: &impl Environment) -> String {
    if env.non_empty(OTEL_EXPORTER_JAEGER_ENDPOINT_KEY).is_some() {
        return String::new();
    }

    match realm(env) {
        Some(realm) => jaeger_realm_endpoint(&realm),
        None => DEFAULT_JAEGER_ENDPOINT.to_string(),
    }
}

fn otlp_signal_endpoint(env: &impl Environment, signal_key: &str) -> String {
    if let Some(endpoint) = env.non_empty(signal_key) {
        return endpoint;
    }

    // The generic endpoint is left to the SDK; it must not be combined with the realm.
    if env.non_empty(OTEL_EXPORTER_OTLP_ENDPOINT_KEY).is_some() {
        return String::new();
    }

    realm(env)
        .map(|realm| otlp_realm_endpoint(&realm))
        .unwrap_or_default()
}

/// The configured realm, unless it is unset, empty or `none`.
fn realm(env: &impl Environment) -> Option<String> {
    env.non_empty(SPLUNK_REALM_KEY)
        .filter(|realm| realm != NONE_REALM)
}
