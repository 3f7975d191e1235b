//! Subscriber installation for the `tracing` events Covenant emits.
//!
//! The client logs one event when a call starts and one when it finishes;
//! the contract builder, failure mapper and dispatcher add their own. All of
//! them carry `contract`, `operation` and `status` fields where known, so a
//! JSON subscriber is the default.
//!
//! ```rust,ignore
//! covenant_telemetry::init_logging(&LogConfig::development())?;
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// How events are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable.
    Pretty,
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `false` leaves subscriber installation to the host application.
    pub enabled: bool,
    /// `EnvFilter` directives, e.g. `covenant_client=debug,warn`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output with the per-parameter `debug!` events visible.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        }
    }

    /// JSON lines at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails on malformed directives or when another global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }
    let filter = create_env_filter(&config.level)?;
    let events = tracing_subscriber::fmt::layer();
    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(events.json().with_filter(filter))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(events.pretty().with_filter(filter))
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses `EnvFilter` directives.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for malformed directives.
pub fn create_env_filter(directives: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
        filter: directives.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LogConfig::default(), LogConfig::production());
        assert_eq!(LogConfig::production().format, LogFormat::Json);

        let development = LogConfig::development();
        assert_eq!(development.level, "debug");
        assert_eq!(development.format, LogFormat::Pretty);
    }

    #[test]
    fn test_section_fills_missing_keys() {
        let config: LogConfig = serde_json::from_str(r#"{"format":"pretty"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "info");
        assert!(config.enabled);
    }

    #[test]
    fn test_section_rejects_unknown_keys() {
        assert!(serde_json::from_str::<LogConfig>(r#"{"colour":true}"#).is_err());
    }

    #[test]
    fn test_filter_directives() {
        assert!(create_env_filter("covenant_client=debug,info").is_ok());
        assert!(matches!(
            create_env_filter("covenant_client=loud"),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
