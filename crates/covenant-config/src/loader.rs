//! Layered configuration loading.

use crate::{ConfigError, CovenantConfig};
use covenant_telemetry::LogFormat;
use std::env;
use std::fs;
use std::path::Path;

/// Default environment prefix.
pub const DEFAULT_ENV_PREFIX: &str = "COVENANT";

/// Loads a [`CovenantConfig`] in layers, later layers overriding earlier ones:
///
/// 1. Defaults (or a preset)
/// 2. A TOML or JSON file
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// The result is validated before it is returned.
///
/// # Example
///
/// ```no_run
/// use covenant_config::ConfigLoader;
///
/// # fn main() -> Result<(), covenant_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("covenant.toml")?
///     .with_env_prefix("COVENANT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CovenantConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CovenantConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CovenantConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CovenantConfig::production();
        self
    }

    /// Loads a file, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed or has unknown
    /// fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::missing(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        self.config = parse(&content, &format)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in the named format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Fails on malformed text, unknown fields or an unknown format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Enables environment overrides with the given prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final value.
    pub fn load(self) -> Result<CovenantConfig, ConfigError> {
        let vars = self
            .env_prefix
            .is_some()
            .then(|| env::vars().collect::<Vec<_>>())
            .unwrap_or_default();
        self.load_with_vars(vars)
    }

    /// Like [`load`](Self::load), reading overrides from `vars` instead of
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final value.
    pub fn load_with_vars<I>(mut self, vars: I) -> Result<CovenantConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some(prefix) = self.env_prefix.take() {
            for (key, value) in vars {
                if let Some(path) = key
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix("__"))
                {
                    apply_override(&mut self.config, &key, path, &value)?;
                }
            }
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CovenantConfig {
        self.config
    }
}

fn parse(content: &str, format: &str) -> Result<CovenantConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn apply_override(
    config: &mut CovenantConfig,
    key: &str,
    path: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let parts: Vec<&str> = path.split("__").collect();
    match parts.as_slice() {
        ["CLIENT", "BASE_URL"] => config.client.base_url = value.to_string(),
        ["CLIENT", "TIMEOUT_MS"] => {
            config.client.timeout_ms = value
                .parse()
                .map_err(|_| ConfigError::env_override(key, "expected integer"))?;
        }
        ["CLIENT", "USER_AGENT"] => config.client.user_agent = value.to_string(),
        ["CLIENT", "DEFAULT_HEADERS", name] => {
            config
                .client
                .default_headers
                .insert(name.to_lowercase().replace('_', "-"), value.to_string());
        }
        ["LOGGING", "ENABLED"] => {
            config.logging.enabled = parse_bool(value)
                .ok_or_else(|| ConfigError::env_override(key, "expected boolean"))?;
        }
        ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
        ["LOGGING", "FORMAT"] => {
            config.logging.format = match value.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => return Err(ConfigError::env_override(key, "expected 'json' or 'pretty'")),
            };
        }
        // unknown keys are ignored
        _ => {}
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load_with_vars(Vec::new()).unwrap();
        assert_eq!(config.client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_development_preset() {
        let config = ConfigLoader::new().with_development().load_unvalidated();
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_with_string_toml() {
        let toml = r#"
            [client]
            base_url = "https://users.internal"
            timeout_ms = 5000

            [client.default_headers]
            x-team = "identity"
        "#;
        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load_with_vars(Vec::new())
            .unwrap();
        assert_eq!(config.client.base_url, "https://users.internal");
        assert_eq!(config.client.timeout_ms, 5000);
        assert_eq!(
            config.client.default_headers.get("x-team").map(String::as_str),
            Some("identity")
        );
    }

    #[test]
    fn test_with_string_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"logging": {"level": "warn"}}"#, "json")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[client]\nretries = 3\n", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .with_env_prefix("covenant")
            .load_with_vars(vars(&[
                ("COVENANT__CLIENT__BASE_URL", "https://override"),
                ("COVENANT__CLIENT__TIMEOUT_MS", "250"),
                ("COVENANT__CLIENT__DEFAULT_HEADERS__X_TEAM", "identity"),
                ("COVENANT__LOGGING__FORMAT", "pretty"),
                ("COVENANT__UNKNOWN", "ignored"),
                ("OTHER__CLIENT__BASE_URL", "https://not-mine"),
            ]))
            .unwrap();
        assert_eq!(config.client.base_url, "https://override");
        assert_eq!(config.client.timeout_ms, 250);
        assert_eq!(
            config.client.default_headers.get("x-team").map(String::as_str),
            Some("identity")
        );
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_parse_failure() {
        let result = ConfigLoader::new()
            .with_env_prefix("COVENANT")
            .load_with_vars(vars(&[("COVENANT__CLIENT__TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(ConfigError::EnvOverride { .. })));
    }

    #[test]
    fn test_overrides_are_validated() {
        let result = ConfigLoader::new()
            .with_env_prefix("COVENANT")
            .load_with_vars(vars(&[("COVENANT__CLIENT__TIMEOUT_MS", "0")]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[client]\nuser_agent = \"users-cli/2\"").unwrap();
        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load_with_vars(Vec::new())
            .unwrap();
        assert_eq!(config.client.user_agent, "users-cli/2");
    }

    #[test]
    fn test_missing_files() {
        assert!(matches!(
            ConfigLoader::new().with_file("/nonexistent/covenant.toml"),
            Err(ConfigError::Missing { .. })
        ));
        assert!(ConfigLoader::new()
            .with_optional_file("/nonexistent/covenant.toml")
            .is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("On"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
