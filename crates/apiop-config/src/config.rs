//! Main configuration types.
//!
//! This module provides the top-level [`ApiOpConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{LogFormat, LoggingConfig, MetricsConfig, ParseConfig, UrlBuilderConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete request-normalization configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use apiop_config::ApiOpConfig;
///
/// let config = ApiOpConfig::default();
/// assert_eq!(config.parse.method_param, "_method");
/// assert_eq!(config.url_builder.default_host, "localhost");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ApiOpConfig {
    /// Request parsing.
    #[serde(default)]
    pub parse: ParseConfig,

    /// Link-builder construction.
    #[serde(default)]
    pub url_builder: UrlBuilderConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl ApiOpConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use apiop_config::{ApiOpConfig, ParseConfig};
    ///
    /// let config = ApiOpConfig::builder()
    ///     .parse(ParseConfig {
    ///         url_prefix: "/v1".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.parse.url_prefix, "/v1");
    /// ```
    #[must_use]
    pub fn builder() -> ApiOpConfigBuilder {
        ApiOpConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `parse.max_form_size` is zero
    /// - a query parameter name is empty
    /// - `parse.url_prefix` is set but does not start with `/`
    /// - `url_builder.default_scheme` is not `http` or `https`
    /// - `url_builder.default_host` is empty
    /// - `logging.level` is not a known level
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.parse.max_form_size == 0 {
            return Err(crate::ConfigError::validation_error(
                "parse.max_form_size must be greater than 0",
            ));
        }

        if self.parse.method_param.is_empty() || self.parse.format_param.is_empty() {
            return Err(crate::ConfigError::validation_error(
                "parse.method_param and parse.format_param must not be empty",
            ));
        }

        if !self.parse.url_prefix.is_empty() && !self.parse.url_prefix.starts_with('/') {
            return Err(crate::ConfigError::validation_error(format!(
                "parse.url_prefix must start with '/': {}",
                self.parse.url_prefix
            )));
        }

        if !matches!(self.url_builder.default_scheme.as_str(), "http" | "https") {
            return Err(crate::ConfigError::validation_error(format!(
                "url_builder.default_scheme must be http or https: {}",
                self.url_builder.default_scheme
            )));
        }

        if self.url_builder.default_host.is_empty() {
            return Err(crate::ConfigError::validation_error(
                "url_builder.default_host must not be empty",
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(crate::ConfigError::validation_error(format!(
                "invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Development preset: debug logging in a readable format.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Production preset: JSON logs, forwarded headers trusted, https links.
    #[must_use]
    pub fn production() -> Self {
        Self {
            url_builder: UrlBuilderConfig {
                trust_forwarded_headers: true,
                default_scheme: "https".to_string(),
                ..Default::default()
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
                ansi_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Builder for [`ApiOpConfig`].
#[derive(Debug, Default)]
pub struct ApiOpConfigBuilder {
    config: ApiOpConfig,
}

impl ApiOpConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parse section.
    #[must_use]
    pub fn parse(mut self, parse: ParseConfig) -> Self {
        self.config.parse = parse;
        self
    }

    /// Set the link-builder section.
    #[must_use]
    pub fn url_builder(mut self, url_builder: UrlBuilderConfig) -> Self {
        self.config.url_builder = url_builder;
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set the metrics section.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.config.metrics = metrics;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ApiOpConfig {
        self.config
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<ApiOpConfig, crate::ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
