//! Environment lookups.
//!
//! Everything in this crate that depends on environment variables reads them
//! through [`Environment`], so configuration can be resolved against the
//! process environment ([`ProcessEnv`]) or against a plain map in tests.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Read-only key-value source of configuration variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` when it is not set.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns the value of `key` only when it is set to a non-empty string.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<K, V> Environment for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
{
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.as_ref().to_string())
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_lookup_returns_set_values() {
        let env = HashMap::from([("SPLUNK_REALM", "us0")]);

        assert_eq!(env.var("SPLUNK_REALM").as_deref(), Some("us0"));
        assert_eq!(env.var("OTEL_SERVICE_NAME"), None);
    }

    #[test]
    fn non_empty_treats_empty_as_unset() {
        let env = HashMap::from([("SPLUNK_REALM", ""), ("SPLUNK_ACCESS_TOKEN", "abc")]);

        assert_eq!(env.non_empty("SPLUNK_REALM"), None);
        assert_eq!(env.non_empty("SPLUNK_ACCESS_TOKEN").as_deref(), Some("abc"));
    }

    #[test]
    fn owned_map_and_reference_lookups_agree() {
        let env: HashMap<String, String> =
            HashMap::from([("LOG_FORMAT".to_string(), "json".to_string())]);
        let by_ref = &env;

        assert_eq!(by_ref.var("LOG_FORMAT"), env.var("LOG_FORMAT"));
    }
}
