use serde::{Deserialize, Serialize};
use std::env;

/// Behavior switches for a [`crate::ProxyFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Reuse a synthesized proxy type for equal descriptors.
    pub cache_proxy_types: bool,
    /// Compile proceed thunks while synthesizing instead of on first call.
    pub eager_thunks: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_proxy_types: true,
            eager_thunks: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

impl ProxyConfig {
    /// Defaults, overridden by `DYNPROXY_CACHE_TYPES` and `DYNPROXY_EAGER_THUNKS`.
    /// Unrecognized values are ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let cache_proxy_types = env::var("DYNPROXY_CACHE_TYPES")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.cache_proxy_types);
        let eager_thunks = env::var("DYNPROXY_EAGER_THUNKS")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.eager_thunks);
        Self {
            cache_proxy_types,
            eager_thunks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert!(config.cache_proxy_types);
        assert!(!config.eager_thunks);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }

    #[test]
    fn test_from_env() {
        env::set_var("DYNPROXY_CACHE_TYPES", "0");
        env::set_var("DYNPROXY_EAGER_THUNKS", "true");
        assert_eq!(
            ProxyConfig::from_env(),
            ProxyConfig {
                cache_proxy_types: false,
                eager_thunks: true,
            }
        );

        env::set_var("DYNPROXY_CACHE_TYPES", "sometimes");
        env::remove_var("DYNPROXY_EAGER_THUNKS");
        assert_eq!(ProxyConfig::from_env(), ProxyConfig::default());

        env::remove_var("DYNPROXY_CACHE_TYPES");
        assert_eq!(ProxyConfig::from_env(), ProxyConfig::default());
    }
}
