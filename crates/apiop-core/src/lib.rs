//! # Apiop Core
//!
//! Core types shared by every apiop crate.
//!
//! - [`ApiOperation`] - Per-request operation descriptor filled in by the normalizer
//! - [`ResponseFormat`] - Closed set of response serialization formats
//! - [`ApiObject`] - Uniform key/value representation of a submitted payload
//! - [`Schema`] / [`SchemaRegistry`] / [`Schemas`] - Resource schema lookup
//! - [`UrlBuilder`] - Link construction for a resolved operation
//! - [`ApiError`] - Standard error type
//! - [`current_operation`] - Request-scoped access to the in-flight operation
//! - [`metric_names`] - Counter names shared by the emitting crates and the recorder

#![doc(html_root_url = "https://docs.rs/apiop-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod context;
mod error;
pub mod fixtures;
pub mod metric_names;
mod object;
mod operation;
mod query;
pub mod schema;

pub use builder::UrlBuilder;
pub use context::{current_operation, CurrentOperation, OperationView, RequestId};
pub use error::{ApiError, ApiResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use object::ApiObject;
pub use operation::{ApiOperation, ResponseFormat};
pub use query::QueryValues;
pub use schema::{Schema, SchemaRegistry, Schemas};
