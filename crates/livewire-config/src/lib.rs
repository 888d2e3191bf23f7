//! Livewire configuration system.
//!
//! Provides TOML-based configuration with validation and environment
//! overrides. All config sections use sensible defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use livewire_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    AuthConfig, EndpointsConfig, HeartbeatConfig, LivewireConfig, LogLevel, LoggingConfig,
    ReconnectConfig, TransportConfig, CONFIG_SCHEMA_VERSION,
};

use livewire_common::ConfigError;

/// Environment variable overriding `endpoints.broadcast_url`.
pub const ENV_BROADCAST_URL: &str = "LIVEWIRE_BROADCAST_URL";
/// Environment variable overriding `endpoints.user_url`.
pub const ENV_USER_URL: &str = "LIVEWIRE_USER_URL";
/// Environment variable overriding `auth.refresh_url`.
pub const ENV_REFRESH_URL: &str = "LIVEWIRE_REFRESH_URL";

/// Load config from the platform default path, apply environment
/// overrides, and validate the result.
pub fn load_config() -> Result<LivewireConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validation::validate(&config)?;
    Ok(config)
}

/// Apply endpoint overrides from the environment.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut LivewireConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BROADCAST_URL).filter(|v| !v.is_empty()) {
        tracing::debug!("{ENV_BROADCAST_URL} overrides endpoints.broadcast_url");
        config.endpoints.broadcast_url = url;
    }
    if let Some(url) = lookup(ENV_USER_URL).filter(|v| !v.is_empty()) {
        tracing::debug!("{ENV_USER_URL} overrides endpoints.user_url");
        config.endpoints.user_url = url;
    }
    if let Some(url) = lookup(ENV_REFRESH_URL).filter(|v| !v.is_empty()) {
        tracing::debug!("{ENV_REFRESH_URL} overrides auth.refresh_url");
        config.auth.refresh_url = Some(url);
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &LivewireConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&LivewireConfig::default());
        assert!(json.contains("\"endpoints\""));
        assert!(json.contains("\"reconnect\""));
        assert!(json.contains("\"heartbeat\""));
        assert!(json.contains("\"transport\""));
        assert!(json.contains("\"auth\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn env_overrides_replace_endpoints() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BROADCAST_URL, "wss://prod.example.com/ws/broadcast/"),
            (ENV_REFRESH_URL, "https://prod.example.com/auth/refresh/"),
        ]);
        let mut config = LivewireConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.endpoints.broadcast_url,
            "wss://prod.example.com/ws/broadcast/"
        );
        assert_eq!(
            config.endpoints.user_url,
            LivewireConfig::default().endpoints.user_url
        );
        assert_eq!(
            config.auth.refresh_url.as_deref(),
            Some("https://prod.example.com/auth/refresh/")
        );
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = LivewireConfig::default();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert!(config.auth.refresh_url.is_none());
        assert_eq!(
            config.endpoints.user_url,
            LivewireConfig::default().endpoints.user_url
        );
    }
}
