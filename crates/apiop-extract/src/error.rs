//! Extraction error types.
//!
//! This module provides error types for body extraction failures,
//! including information about where the failing data came from.

use apiop_core::ApiError;
use http::StatusCode;
use std::fmt;

/// Source of extraction (where data was being extracted from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Multipart form data
    Multipart,
    /// URL-encoded form data
    Form,
    /// Raw request body (JSON, YAML)
    Body,
    /// Content-Type header specifically
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multipart => write!(f, "multipart"),
            Self::Form => write!(f, "form"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// Error that occurs during body extraction.
///
/// # Example
///
/// ```rust
/// use apiop_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::payload_too_large(ExtractionSource::Body, 10, 20);
/// assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
/// assert_eq!(err.extraction_source(), ExtractionSource::Body);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
    limits: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Content-Type is missing or not what the parser handles
    InvalidContentType,
    /// Payload could not be decoded
    DeserializationFailed,
    /// Payload is too large
    PayloadTooLarge,
    /// Too many parts or fields
    TooManyFields,
}

impl ExtractionError {
    /// Creates an error for a missing or unusable Content-Type.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::InvalidContentType,
            message: format!("invalid content type: {}", details.into()),
            limits: None,
        }
    }

    /// Creates an error for a payload that failed to decode.
    #[must_use]
    pub fn deserialization_failed(source: ExtractionSource, error: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("Failed to parse {source}: {}", error.into()),
            limits: None,
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    pub fn payload_too_large(source: ExtractionSource, max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!(
                "{source} too large: max {max_size} bytes, got {actual_size} bytes"
            ),
            limits: Some((max_size, actual_size)),
        }
    }

    /// Creates an error for exceeding the field count limit.
    #[must_use]
    pub fn too_many_fields(max_fields: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Multipart,
            kind: ExtractionErrorKind::TooManyFields,
            message: format!("too many fields (max {max_fields})"),
            limits: None,
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::InvalidContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::DeserializationFailed
            | ExtractionErrorKind::TooManyFields => StatusCode::UNPROCESSABLE_ENTITY,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::InvalidContentType => "INVALID_CONTENT_TYPE",
            ExtractionErrorKind::DeserializationFailed => "INVALID_BODY_CONTENT",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::TooManyFields => "TOO_MANY_FIELDS",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match (err.kind, err.limits) {
            (ExtractionErrorKind::PayloadTooLarge, Some((max, actual))) => {
                ApiError::payload_too_large(max, actual)
            }
            _ => ApiError::invalid_body_content(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiop_core::ErrorCategory;

    #[test]
    fn test_deserialization_failed_error() {
        let err = ExtractionError::deserialization_failed(ExtractionSource::Body, "EOF");

        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "INVALID_BODY_CONTENT");
        assert_eq!(err.to_string(), "Failed to parse body: EOF");
    }

    #[test]
    fn test_payload_too_large_error() {
        let err = ExtractionError::payload_too_large(ExtractionSource::Multipart, 1024, 2048);

        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_invalid_content_type_error() {
        let err = ExtractionError::invalid_content_type("missing boundary");

        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_into_api_error() {
        let api: ApiError =
            ExtractionError::deserialization_failed(ExtractionSource::Body, "bad json").into();
        assert_eq!(api.category(), ErrorCategory::InvalidBodyContent);
        assert!(api.to_string().contains("bad json"));

        let api: ApiError =
            ExtractionError::payload_too_large(ExtractionSource::Body, 1, 2).into();
        assert_eq!(api.category(), ErrorCategory::PayloadTooLarge);
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Multipart.to_string(), "multipart");
        assert_eq!(ExtractionSource::Form.to_string(), "form");
        assert_eq!(ExtractionSource::Body.to_string(), "body");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
