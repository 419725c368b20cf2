//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ApiOpConfig, ConfigError, LogFormat};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use apiop_config::ConfigLoader;
///
/// # fn main() -> Result<(), apiop_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("apiop.toml")?
///     .with_env_prefix("APIOP")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ApiOpConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ApiOpConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ApiOpConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use apiop_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ApiOpConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ApiOpConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json), chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use apiop_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [parse]
    ///     url_prefix = "/v1"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.parse.url_prefix, "/v1");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `APIOP__PARSE__URL_PREFIX=/v1`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file (searched upward from the working directory) into
    /// the process environment, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if a `.env` file exists but cannot
    /// be read or parsed. A missing file is ignored.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        ignore_missing(dotenvy::dotenv())?;
        Ok(self)
    }

    /// Load the given env file into the process environment, if present.
    ///
    /// # Errors
    ///
    /// Same as [`with_dotenv`](Self::with_dotenv).
    pub fn with_dotenv_path<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        ignore_missing(dotenvy::from_path(path.as_ref()))?;
        Ok(self)
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<ApiOpConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without applying environment overrides or validating.
    #[must_use]
    pub fn load_unvalidated(self) -> ApiOpConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<ApiOpConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
        else {
            // Shares the prefix but not the separator, e.g. APIOPX_*
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            // Parse section
            ["PARSE", "MAX_FORM_SIZE"] => {
                self.config.parse.max_form_size = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["PARSE", "URL_PREFIX"] => {
                self.config.parse.url_prefix = value.to_string();
            }
            ["PARSE", "METHOD_PARAM"] => {
                self.config.parse.method_param = value.to_string();
            }
            ["PARSE", "FORMAT_PARAM"] => {
                self.config.parse.format_param = value.to_string();
            }

            // Link-builder section
            ["URL_BUILDER", "TRUST_FORWARDED_HEADERS"] => {
                self.config.url_builder.trust_forwarded_headers = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["URL_BUILDER", "DEFAULT_SCHEME"] => {
                self.config.url_builder.default_scheme = value.to_lowercase();
            }
            ["URL_BUILDER", "DEFAULT_HOST"] => {
                self.config.url_builder.default_host = value.to_string();
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Metrics section
            ["METRICS", "ENABLED"] => {
                self.config.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

fn ignore_missing<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
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

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, ApiOpConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.url_builder.default_scheme, "https");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"url_builder": {"default_host": "api.internal"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.url_builder.default_host, "api.internal");
        assert_eq!(config.parse.method_param, "_method");
    }

    #[test]
    fn test_loader_unsupported_format() {
        let result = ConfigLoader::new().with_string("", "ini");
        assert!(result.is_err());
    }

    #[test]
    fn test_loader_invalid_toml() {
        let result = ConfigLoader::new().with_string("[parse\nurl_prefix", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_validation_runs() {
        let result = ConfigLoader::new()
            .with_string("[parse]\nmax_form_size = 0", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("APIOPTEST1__PARSE__URL_PREFIX", "/v2");
        env::set_var("APIOPTEST1__PARSE__MAX_FORM_SIZE", "1024");
        env::set_var("APIOPTEST1__URL_BUILDER__TRUST_FORWARDED_HEADERS", "off");
        env::set_var("APIOPTEST1__LOGGING__FORMAT", "Pretty");
        env::set_var("APIOPTEST1__UNKNOWN__KEY", "ignored");

        let config = ConfigLoader::new()
            .with_env_prefix("apioptest1")
            .load()
            .unwrap();

        assert_eq!(config.parse.url_prefix, "/v2");
        assert_eq!(config.parse.max_form_size, 1024);
        assert!(!config.url_builder.trust_forwarded_headers);
        assert_eq!(config.logging.format, LogFormat::Pretty);

        env::remove_var("APIOPTEST1__PARSE__URL_PREFIX");
        env::remove_var("APIOPTEST1__PARSE__MAX_FORM_SIZE");
        env::remove_var("APIOPTEST1__URL_BUILDER__TRUST_FORWARDED_HEADERS");
        env::remove_var("APIOPTEST1__LOGGING__FORMAT");
        env::remove_var("APIOPTEST1__UNKNOWN__KEY");
    }

    #[test]
    fn test_env_parse_failure() {
        env::set_var("APIOPTEST2__PARSE__MAX_FORM_SIZE", "lots");

        let result = ConfigLoader::new().with_env_prefix("APIOPTEST2").load();

        env::remove_var("APIOPTEST2__PARSE__MAX_FORM_SIZE");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("APIOPTEST2__PARSE__MAX_FORM_SIZE"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
