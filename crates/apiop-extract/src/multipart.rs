//! Multipart form data collection.
//!
//! [`Multipart`] walks a buffered `multipart/form-data` body with `multer`
//! and collects the plain (non-file) fields into a value map.
//!
//! # Example
//!
//! ```rust
//! use apiop_extract::{Multipart, MultipartConfig};
//! use bytes::Bytes;
//! use http::{header, HeaderMap};
//!
//! # tokio_test::block_on(async {
//! let mut headers = HeaderMap::new();
//! headers.insert(
//!     header::CONTENT_TYPE,
//!     "multipart/form-data; boundary=XyZ".parse().unwrap(),
//! );
//! let body = Bytes::from(
//!     "--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n--XyZ--\r\n",
//! );
//!
//! let mut multipart = Multipart::from_request(&headers, body, MultipartConfig::new()).unwrap();
//! let values = multipart.collect_values().await.unwrap();
//! assert_eq!(values["a"], vec!["1".to_string()]);
//! # });
//! ```

use bytes::Bytes;
use http::{header, HeaderMap};
use std::collections::HashMap;
use std::io;

use crate::{ExtractionError, ExtractionSource};

/// Maximum total size of a form submission (2 MiB).
pub const MAX_FORM_SIZE: usize = 2 * 1024 * 1024;

/// Default maximum number of parts.
pub const DEFAULT_MAX_FIELDS: usize = 1000;

/// Configuration for multipart parsing.
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum number of parts allowed.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_body_size: MAX_FORM_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum number of parts.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// A buffered `multipart/form-data` body.
pub struct Multipart {
    inner: multer::Multipart<'static>,
    config: MultipartConfig,
    field_count: usize,
}

impl Multipart {
    /// Create a new reader from request components.
    ///
    /// # Errors
    ///
    /// Returns an error if the Content-Type header is missing, is not
    /// `multipart/form-data` with a boundary, or the body exceeds
    /// `config.max_body_size`.
    pub fn from_request(
        headers: &HeaderMap,
        body: Bytes,
        config: MultipartConfig,
    ) -> Result<Self, ExtractionError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .ok_or_else(|| ExtractionError::invalid_content_type("missing Content-Type header"))?
            .to_str()
            .map_err(|_| {
                ExtractionError::invalid_content_type("invalid UTF-8 in Content-Type header")
            })?;

        let boundary = multer::parse_boundary(content_type).map_err(|_| {
            ExtractionError::invalid_content_type(
                "missing or invalid boundary in multipart Content-Type",
            )
        })?;

        if body.len() > config.max_body_size {
            return Err(ExtractionError::payload_too_large(
                ExtractionSource::Multipart,
                config.max_body_size,
                body.len(),
            ));
        }

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let inner = multer::Multipart::new(stream, boundary);

        Ok(Self {
            inner,
            config,
            field_count: 0,
        })
    }

    /// Get the next part from the body.
    ///
    /// Returns `None` when all parts have been processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the maximum number of parts is exceeded or the
    /// body is malformed.
    pub async fn next_field(&mut self) -> Result<Option<multer::Field<'static>>, ExtractionError> {
        if self.field_count >= self.config.max_fields {
            return Err(ExtractionError::too_many_fields(self.config.max_fields));
        }

        match self.inner.next_field().await {
            Ok(Some(field)) => {
                self.field_count += 1;
                Ok(Some(field))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(ExtractionError::deserialization_failed(
                ExtractionSource::Multipart,
                e.to_string(),
            )),
        }
    }

    /// Collects every named, non-file part into a value map.
    ///
    /// Values for a repeated name keep their submission order. Parts with a
    /// file name are uploads, not values, and are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is malformed or a value is not UTF-8.
    pub async fn collect_values(&mut self) -> Result<HashMap<String, Vec<String>>, ExtractionError> {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();

        while let Some(field) = self.next_field().await? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field.text().await.map_err(|e| {
                ExtractionError::deserialization_failed(
                    ExtractionSource::Multipart,
                    format!("failed to read field `{name}`: {e}"),
                )
            })?;
            values.entry(name).or_default().push(text);
        }

        Ok(values)
    }
}

impl std::fmt::Debug for Multipart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multipart")
            .field("config", &self.config)
            .field("field_count", &self.field_count)
            .finish_non_exhaustive()
    }
}

/// Parses `body` as multipart form data and returns its plain values.
///
/// # Errors
///
/// See [`Multipart::from_request`] and [`Multipart::collect_values`].
pub async fn multipart_values(
    headers: &HeaderMap,
    body: Bytes,
    config: MultipartConfig,
) -> Result<HashMap<String, Vec<String>>, ExtractionError> {
    Multipart::from_request(headers, body, config)?
        .collect_values()
        .await
}
