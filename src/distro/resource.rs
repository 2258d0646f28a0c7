use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::{
    SERVICE_NAME, SERVICE_VERSION, TELEMETRY_DISTRO_NAME, TELEMETRY_DISTRO_VERSION,
};

use crate::distro::config::DistroConfig;

pub const DISTRO_NAME: &str = "splunk-otel-rust";
pub const DISTRO_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Legacy attribute carrying the distribution version
pub const SPLUNK_DISTRO_VERSION: &str = "splunk.distro.version";

/// Get base attributes for any resource
pub fn base_attributes(config: &DistroConfig) -> Vec<KeyValue> {
    let mut attrs = vec![
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(TELEMETRY_DISTRO_NAME, DISTRO_NAME),
        KeyValue::new(TELEMETRY_DISTRO_VERSION, DISTRO_VERSION),
        KeyValue::new(SPLUNK_DISTRO_VERSION, DISTRO_VERSION),
    ];
    if let Some(version) = &config.service_version {
        attrs.push(KeyValue::new(SERVICE_VERSION, version.clone()));
    }
    attrs
}

/// Build the resource shared by every provider
pub fn build_resource(config: &DistroConfig) -> Resource {
    Resource::builder()
        .with_attributes(base_attributes(config))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(attrs: &[KeyValue], key: &str, value: &str) -> bool {
        attrs
            .iter()
            .any(|kv| kv.key.as_str() == key && kv.value.as_str() == value)
    }

    #[test]
    fn base_attributes_contains_service_and_distro() {
        let config = DistroConfig::new("test-service");
        let attrs = base_attributes(&config);

        assert!(has(&attrs, SERVICE_NAME, "test-service"));
        assert!(has(&attrs, TELEMETRY_DISTRO_NAME, DISTRO_NAME));
        assert!(has(&attrs, SPLUNK_DISTRO_VERSION, DISTRO_VERSION));
        assert!(!attrs.iter().any(|kv| kv.key.as_str() == SERVICE_VERSION));
    }

    #[test]
    fn base_attributes_contains_service_version_when_set() {
        let config = DistroConfig::new("test-service").with_service_version("1.2.3");
        let attrs = base_attributes(&config);

        assert!(has(&attrs, SERVICE_VERSION, "1.2.3"));
    }

    #[test]
    fn build_resource_uses_configured_service_name() {
        let config = DistroConfig::new("test-service");

        let resource = build_resource(&config);

        assert_eq!(
            resource.get(&opentelemetry::Key::from_static_str(SERVICE_NAME)),
            Some(opentelemetry::Value::from("test-service"))
        );
    }
}
