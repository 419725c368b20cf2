//! # Apiop
//!
//! Turns an inbound HTTP request into a normalized [`ApiOperation`]: the
//! effective method, the response format, the addressed resource type, name,
//! link and action, and a link-builder for outgoing URLs. Request bodies are
//! extracted into an [`ApiObject`] from multipart, URL-encoded or raw
//! JSON/YAML payloads.
//!
//! This is the facade crate. It re-exports:
//!
//! - [`core`] - operations, errors, schemas, query values
//! - [`extract`] - body extraction
//! - [`parse`] - method/format resolution, URL parsing, normalization
//! - [`config`] - typed configuration loading
//! - [`telemetry`] - logging and metrics setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apiop::prelude::*;
//! use apiop::core::fixtures;
//! use bytes::Bytes;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().with_env_prefix("APIOP").load()?;
//! apiop::telemetry::init_telemetry(&config)?;
//! let apiop = ApiOp::from_config(&config);
//!
//! let request = http::Request::post("/clusters")
//!     .header("content-type", "application/json")
//!     .body(Bytes::from_static(br#"{"name": "c1"}"#))?;
//! let body = apiop.extract_body(&request).await?;
//!
//! let mut op = ApiOperation::new()
//!     .with_request(request)
//!     .with_schemas(fixtures::shared_cluster_schemas());
//! apiop.normalize(&mut op)?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/apiop/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;

pub use pipeline::ApiOp;

pub use apiop_config::ApiOpConfig;
pub use apiop_core::{ApiError, ApiObject, ApiOperation};

// Re-export core types
pub use apiop_core as core;

// Re-export body extraction
pub use apiop_extract as extract;

// Re-export request parsing
pub use apiop_parse as parse;

// Re-export configuration
pub use apiop_config as config;

// Re-export telemetry setup
pub use apiop_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use apiop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ApiOp;

    pub use apiop_core::{
        current_operation, ApiError, ApiObject, ApiOperation, ApiResult, ErrorCategory,
        QueryValues, ResponseFormat, Schema, SchemaRegistry, Schemas, UrlBuilder,
    };

    pub use apiop_extract::{extract_body, BodyReader, DecodingBodyReader, ExtractionError};

    pub use apiop_parse::{
        parse, resolve_format, resolve_method, DefaultUrlParser, Normalizer, ParseAttempt,
        ParsedUrl, UrlParser,
    };

    pub use apiop_config::{ApiOpConfig, ConfigLoader};
}
