//! # Apiop Parse
//!
//! Normalizes an inbound request into an [`ApiOperation`](apiop_core::ApiOperation).
//!
//! - [`resolve_method`] - effective method, honoring `_method`
//! - [`resolve_format`] - response format: `_format`, browser, `Accept`, then json
//! - [`UrlParser`] / [`DefaultUrlParser`] - URL-parsing strategies with deferred errors
//! - [`UrlBuilderFactory`] / [`DefaultUrlBuilderFactory`] - link-builder construction
//! - [`validate_method`] - method check against the resolved schema
//! - [`Normalizer`] / [`parse`] - the pipeline tying it all together
//!
//! ## Example
//!
//! ```rust
//! use apiop_core::{fixtures, ApiOperation, ResponseFormat, UrlBuilder};
//! use apiop_parse::{parse, DefaultUrlParser};
//! use bytes::Bytes;
//! use http::Request;
//!
//! let request = Request::get("/policies/p1?_format=yaml")
//!     .header("host", "api.example.com")
//!     .body(Bytes::new())
//!     .unwrap();
//! let mut op = ApiOperation::new()
//!     .with_request(request)
//!     .with_schemas(fixtures::shared_cluster_schemas());
//!
//! parse(&mut op, &DefaultUrlParser::default()).unwrap();
//!
//! assert_eq!(op.type_name, "policy");
//! assert_eq!(op.name, "p1");
//! assert_eq!(op.response_format, Some(ResponseFormat::Yaml));
//! let links = op.url_builder.as_ref().unwrap();
//! assert_eq!(links.collection("policy"), "http://api.example.com/policies");
//! ```

#![doc(html_root_url = "https://docs.rs/apiop-parse/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod format;
mod method;
mod normalize;
mod url;
mod validate;

pub use builder::{
    DefaultUrlBuilder, DefaultUrlBuilderFactory, PathResolver, UrlBuilderFactory, DEFAULT_HOST,
    X_FORWARDED_HOST, X_FORWARDED_PROTO,
};
pub use format::{is_browser, resolve_format, resolve_format_with, FORMAT_PARAM};
pub use method::{resolve_method, resolve_method_with, METHOD_PARAM};
pub use normalize::{parse, Normalizer, NormalizerConfig};
pub use url::{
    url_parser_fn, DefaultUrlParser, ParseAttempt, ParsedUrl, UrlParser, ACTION_PARAM,
    REMOVE_ACTION,
};
pub use validate::{validate_method, SUPPORTED_METHODS};
