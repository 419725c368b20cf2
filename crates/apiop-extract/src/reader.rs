//! Raw body reading.

use apiop_core::ApiObject;
use bytes::Bytes;
use http::{header, Method, Request};
use serde_json::{Map, Value};

use crate::multipart::MAX_FORM_SIZE;
use crate::{ExtractionError, ExtractionSource};

/// Reads a request body that is neither multipart nor a URL-encoded form.
///
/// Implemented for any `Fn(&Request<Bytes>) -> Result<ApiObject, ExtractionError>`,
/// so tests and embedders can pass a closure.
pub trait BodyReader: Send + Sync {
    /// Decodes the body of `request` into an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be decoded.
    fn read_body(&self, request: &Request<Bytes>) -> Result<ApiObject, ExtractionError>;
}

impl<F> BodyReader for F
where
    F: Fn(&Request<Bytes>) -> Result<ApiObject, ExtractionError> + Send + Sync,
{
    fn read_body(&self, request: &Request<Bytes>) -> Result<ApiObject, ExtractionError> {
        self(request)
    }
}

/// JSON/YAML body reader.
///
/// - Only `POST` and `PUT` carry a body; other methods read as empty.
/// - An empty body reads as an empty object.
/// - `Content-Type: application/yaml` is decoded as YAML, anything else as JSON.
/// - The top level must be an object.
///
/// # Example
///
/// ```rust
/// use apiop_extract::{BodyReader, DecodingBodyReader};
/// use bytes::Bytes;
/// use http::Request;
///
/// let request = Request::post("/clusters")
///     .body(Bytes::from_static(br#"{"name": "c1"}"#))
///     .unwrap();
///
/// let body = DecodingBodyReader::default().read_body(&request).unwrap();
/// assert_eq!(body["name"], "c1");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DecodingBodyReader {
    limit: usize,
}

impl DecodingBodyReader {
    /// Creates a reader rejecting bodies larger than `limit` bytes.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Returns the size limit in bytes.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for DecodingBodyReader {
    fn default() -> Self {
        Self::new(MAX_FORM_SIZE)
    }
}

impl BodyReader for DecodingBodyReader {
    fn read_body(&self, request: &Request<Bytes>) -> Result<ApiObject, ExtractionError> {
        if !matches!(*request.method(), Method::POST | Method::PUT) {
            return Ok(ApiObject::new());
        }

        let body = request.body();
        if body.is_empty() {
            return Ok(ApiObject::new());
        }
        if body.len() > self.limit {
            return Err(ExtractionError::payload_too_large(
                ExtractionSource::Body,
                self.limit,
                body.len(),
            ));
        }

        let is_yaml = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            == Some("application/yaml");

        let map: Map<String, Value> = if is_yaml {
            serde_yaml::from_slice(body).map_err(|e| {
                ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
            })?
        } else {
            serde_json::from_slice(body).map_err(|e| {
                ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
            })?
        };

        Ok(ApiObject::from(map))
    }
}
