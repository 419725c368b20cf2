//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Default multipart/form size limit (2 MiB).
pub const DEFAULT_MAX_FORM_SIZE: usize = 2 * 1024 * 1024;

/// Request parsing section.
///
/// # Example
///
/// ```
/// use apiop_config::ParseConfig;
///
/// let config = ParseConfig::default();
/// assert_eq!(config.method_param, "_method");
/// assert_eq!(config.format_param, "_format");
/// assert_eq!(config.max_form_size, 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParseConfig {
    /// Maximum size in bytes of a form or raw body.
    #[serde(default = "default_max_form_size")]
    pub max_form_size: usize,

    /// Path prefix the API is served under (e.g., "/v1").
    #[serde(default)]
    pub url_prefix: String,

    /// Query parameter overriding the HTTP method.
    #[serde(default = "default_method_param")]
    pub method_param: String,

    /// Query parameter forcing the response format.
    #[serde(default = "default_format_param")]
    pub format_param: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_form_size: default_max_form_size(),
            url_prefix: String::new(),
            method_param: default_method_param(),
            format_param: default_format_param(),
        }
    }
}

fn default_max_form_size() -> usize {
    DEFAULT_MAX_FORM_SIZE
}

fn default_method_param() -> String {
    "_method".to_string()
}

fn default_format_param() -> String {
    "_format".to_string()
}

/// Link-builder section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UrlBuilderConfig {
    /// Honor `X-Forwarded-Proto` and `X-Forwarded-Host`.
    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,

    /// Scheme used when the request does not carry one ("http" or "https").
    #[serde(default = "default_scheme")]
    pub default_scheme: String,

    /// Host used when the request does not name one.
    #[serde(default = "default_host")]
    pub default_host: String,
}

impl Default for UrlBuilderConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_headers: true,
            default_scheme: default_scheme(),
            default_host: default_host(),
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}
