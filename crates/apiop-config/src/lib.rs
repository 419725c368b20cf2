//! Typed configuration for apiop request normalization.
//!
//! This crate provides:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`ApiOpConfig`] holds every section:
//!
//! - [`ParseConfig`] - body size limit, URL prefix, override parameters
//! - [`UrlBuilderConfig`] - forwarded-header trust, default scheme and host
//! - [`LoggingConfig`] - log level and output format
//! - [`MetricsConfig`] - Prometheus recorder toggle
//!
//! # Example
//!
//! ```no_run
//! use apiop_config::ConfigLoader;
//!
//! # fn main() -> Result<(), apiop_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("apiop.toml")?
//!     .with_env_prefix("APIOP")
//!     .load()?;
//!
//! println!("API served under: {}", config.parse.url_prefix);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [parse]
//! max_form_size = 2097152
//! url_prefix = "/v1"
//! method_param = "_method"
//! format_param = "_format"
//!
//! [url_builder]
//! trust_forwarded_headers = true
//! default_scheme = "https"
//! default_host = "api.example.com"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```

#![doc(html_root_url = "https://docs.rs/apiop-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{ApiOpConfig, ApiOpConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    LogFormat, LoggingConfig, MetricsConfig, ParseConfig, UrlBuilderConfig, DEFAULT_MAX_FORM_SIZE,
};
