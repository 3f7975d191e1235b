//! # Covenant Config
//!
//! Typed configuration for Covenant clients.
//!
//! - [`CovenantConfig`] - Root configuration with `[client]` and `[logging]` sections
//! - [`ClientConfig`] - Base URL, timeout, user agent and default headers
//! - [`ConfigLoader`] - Defaults, then a TOML/JSON file, then `COVENANT__*` env overrides
//!
//! Unknown fields are rejected at every level.
//!
//! ```
//! use covenant_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string("[client]\nbase_url = \"https://users.internal\"\n", "toml")
//!     .unwrap()
//!     .load_unvalidated();
//! assert_eq!(config.client.base_url, "https://users.internal");
//! ```

#![doc(html_root_url = "https://docs.rs/covenant-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{ClientConfig, CovenantConfig, DEFAULT_TIMEOUT_MS};
pub use covenant_telemetry::{LogConfig, LogFormat};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
