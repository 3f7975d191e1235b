//! # Covenant Telemetry
//!
//! Logging and metrics shared by the Covenant crates.
//!
//! - [`init_logging`] / [`LogConfig`] - Installs a JSON or pretty `tracing` subscriber
//! - [`record_call`] - Client call counter and latency histogram

#![doc(html_root_url = "https://docs.rs/covenant-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use metrics::{record_call, CALLS_TOTAL, CALL_DURATION_SECONDS};

/// Result type for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
