//! Configuration types.

use crate::ConfigError;
use covenant_telemetry::{create_env_filter, LogConfig};
use http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings of a contract client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL every operation URL is appended to.
    pub base_url: String,

    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,

    /// `User-Agent` sent with every call.
    pub user_agent: String,

    /// Headers sent with every call.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: format!("covenant/{}", env!("CARGO_PKG_VERSION")),
            default_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// The timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Fails on a base URL that is not `http(s)://`, a zero timeout, an
    /// empty user agent or a header that is not valid HTTP.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "client.base_url",
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "client.timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("client.user_agent", "must not be empty"));
        }
        for (name, value) in &self.default_headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ConfigError::invalid(
                    format!("client.default_headers.{name}"),
                    "not a valid header name",
                )
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ConfigError::invalid(
                    format!("client.default_headers.{name}"),
                    "not a valid header value",
                )
            })?;
        }
        Ok(())
    }
}

/// Complete Covenant configuration.
///
/// ```toml
/// [client]
/// base_url = "https://users.internal"
/// timeout_ms = 5000
///
/// [client.default_headers]
/// x-team = "identity"
///
/// [logging]
/// level = "covenant_client=debug,info"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CovenantConfig {
    /// Client section.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging section.
    #[serde(default)]
    pub logging: LogConfig,
}

impl CovenantConfig {
    /// Human-readable debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            client: ClientConfig::default(),
            logging: LogConfig::development(),
        }
    }

    /// JSON logging at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            client: ClientConfig::default(),
            logging: LogConfig::production(),
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client.validate()?;
        create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid("logging.level", e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CovenantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.client.timeout(), Duration::from_secs(30));
        assert!(config.client.user_agent.starts_with("covenant/"));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = CovenantConfig {
            client: ClientConfig {
                base_url: "users.internal".to_string(),
                ..ClientConfig::default()
            },
            ..CovenantConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "client.base_url"
        ));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = CovenantConfig::default();
        config.client.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_header() {
        let mut config = CovenantConfig::default();
        config
            .client
            .default_headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = CovenantConfig::development();
        config.logging.level = "covenant=loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "logging.level"
        ));
    }
}
