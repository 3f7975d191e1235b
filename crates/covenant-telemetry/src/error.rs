//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected filter.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed, or installing it failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
