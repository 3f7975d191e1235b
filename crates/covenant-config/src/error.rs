//! Errors raised while loading or validating a [`CovenantConfig`](crate::CovenantConfig).

use std::path::PathBuf;
use thiserror::Error;

/// A configuration source could not be turned into a valid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named file does not exist.
    #[error("no covenant configuration at {path}")]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read covenant configuration at {path}")]
    Unreadable {
        /// Path that was read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or an unknown key.
    #[error("malformed TOML in covenant configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON or an unknown key.
    #[error("malformed JSON in covenant configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is not acceptable.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted path of the offending value, e.g. `client.timeout_ms`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `COVENANT__*` variable holds a value of the wrong kind.
    #[error("environment override {var}: {reason}")]
    EnvOverride {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// An unacceptable value at `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
