//! # Apiop Extract
//!
//! Turns a request body into one [`ApiObject`](apiop_core::ApiObject),
//! whatever shape the client submitted it in.
//!
//! | Source | Condition | Result |
//! |--------|-----------|--------|
//! | Multipart | `multipart/form-data` with at least one plain field | field name → array of strings |
//! | Form | URL-encoded body on `POST`/`PUT`/`PATCH` | field name → array of strings (body, then query) |
//! | Raw | anything else | whatever the [`BodyReader`] returns |
//!
//! ## Example
//!
//! ```rust
//! use apiop_extract::{extract_body, DecodingBodyReader};
//! use bytes::Bytes;
//! use http::Request;
//!
//! # tokio_test::block_on(async {
//! let request = Request::post("/clusters")
//!     .header("content-type", "application/json")
//!     .body(Bytes::from_static(br#"{"name": "c1"}"#))
//!     .unwrap();
//!
//! let body = extract_body(&request, &DecodingBodyReader::default()).await.unwrap();
//! assert_eq!(body["name"], "c1");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/apiop-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod error;
mod form;
pub mod multipart;
mod reader;

pub use body::{extract_body, extract_body_with_limit};
pub use error::{ExtractionError, ExtractionSource};
pub use form::{form_values, is_form_request};
pub use multipart::{multipart_values, Multipart, MultipartConfig, MAX_FORM_SIZE};
pub use reader::{BodyReader, DecodingBodyReader};
