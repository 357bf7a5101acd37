//! Environment-driven controller configuration

use crate::error::ConfigError;
use mdns_discovery::RouterLabel;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_NAMESPACE: &str = "MDNS_NAMESPACE";
pub const ENV_ROUTER_SERVICE_LABEL: &str = "MDNS_ROUTER_SERVICE_LABEL";
pub const ENV_RESOLVE_TIMEOUT_SECS: &str = "MDNS_RESOLVE_TIMEOUT_SECS";
pub const ENV_CACHE_SYNC_TIMEOUT_SECS: &str = "MDNS_CACHE_SYNC_TIMEOUT_SECS";
pub const ENV_RECORD_CHANNEL_CAPACITY: &str = "MDNS_RECORD_CHANNEL_CAPACITY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; every namespace when `None`
    pub namespace: Option<String>,
    /// Label identifying the routing layer's LoadBalancer services
    pub router_label: RouterLabel,
    /// Bound on the startup address resolution
    pub resolve_timeout: Duration,
    /// How long to wait for the initial watch sync before warning
    pub cache_sync_timeout: Duration,
    /// Capacity of the bounded record channel
    pub record_channel_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            router_label: RouterLabel::default(),
            resolve_timeout: Duration::from_secs(30),
            cache_sync_timeout: Duration::from_secs(60),
            record_channel_capacity: 64,
        }
    }
}

impl ControllerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let router_label = match var(ENV_ROUTER_SERVICE_LABEL) {
            Some(value) => value.parse::<RouterLabel>().map_err(|e| ConfigError::InvalidValue {
                var_name: ENV_ROUTER_SERVICE_LABEL.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.router_label,
        };

        let resolve_timeout = match var(ENV_RESOLVE_TIMEOUT_SECS) {
            Some(value) => Duration::from_secs(parse_value(ENV_RESOLVE_TIMEOUT_SECS, &value)?),
            None => defaults.resolve_timeout,
        };

        let cache_sync_timeout = match var(ENV_CACHE_SYNC_TIMEOUT_SECS) {
            Some(value) => Duration::from_secs(parse_value(ENV_CACHE_SYNC_TIMEOUT_SECS, &value)?),
            None => defaults.cache_sync_timeout,
        };

        let record_channel_capacity = match var(ENV_RECORD_CHANNEL_CAPACITY) {
            Some(value) => {
                let capacity: usize = parse_value(ENV_RECORD_CHANNEL_CAPACITY, &value)?;
                if capacity == 0 {
                    return Err(ConfigError::InvalidValue {
                        var_name: ENV_RECORD_CHANNEL_CAPACITY.to_string(),
                        value,
                        reason: "capacity must be greater than 0".to_string(),
                    });
                }
                capacity
            }
            None => defaults.record_channel_capacity,
        };

        Ok(Self {
            namespace: var(ENV_NAMESPACE).map(|ns| ns.trim().to_string()),
            router_label,
            resolve_timeout,
            cache_sync_timeout,
            record_channel_capacity,
        })
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var_name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ControllerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ControllerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.resolve_timeout, Duration::from_secs(30));
        assert_eq!(config.router_label.to_string(), "app.kubernetes.io/name=traefik");
        assert_eq!(config.namespace, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_NAMESPACE, "media"),
            (ENV_ROUTER_SERVICE_LABEL, "app=gateway"),
            (ENV_RESOLVE_TIMEOUT_SECS, "5"),
            (ENV_CACHE_SYNC_TIMEOUT_SECS, "10"),
            (ENV_RECORD_CHANNEL_CAPACITY, "8"),
        ])
        .unwrap();

        assert_eq!(config.namespace.as_deref(), Some("media"));
        assert_eq!(config.router_label, RouterLabel::new("app", "gateway"));
        assert_eq!(config.resolve_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_sync_timeout, Duration::from_secs(10));
        assert_eq!(config.record_channel_capacity, 8);
    }

    #[test]
    fn test_blank_namespace_watches_everything() {
        let config = config_from(&[(ENV_NAMESPACE, "  ")]).unwrap();
        assert_eq!(config.namespace, None);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = config_from(&[(ENV_RESOLVE_TIMEOUT_SECS, "soon")]).unwrap_err();
        match err {
            ConfigError::InvalidValue { var_name, value, .. } => {
                assert_eq!(var_name, ENV_RESOLVE_TIMEOUT_SECS);
                assert_eq!(value, "soon");
            }
        }
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(config_from(&[(ENV_RECORD_CHANNEL_CAPACITY, "0")]).is_err());
    }

    #[test]
    fn test_invalid_label() {
        let err = config_from(&[(ENV_ROUTER_SERVICE_LABEL, "traefik")]).unwrap_err();
        assert!(err.to_string().contains(ENV_ROUTER_SERVICE_LABEL));
    }
}
