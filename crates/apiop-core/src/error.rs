//! Error types for apiop.
//!
//! This module provides the [`ApiError`] type, which is the standard error
//! type returned by request normalization and body extraction.
//!
//! | `ErrorCategory` | Status | Code |
//! |---|---|---|
//! | `InvalidRequest` | 400 | `INVALID_REQUEST` |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `MethodNotAllowed` | 405 | `METHOD_NOT_ALLOWED` |
//! | `PayloadTooLarge` | 413 | `PAYLOAD_TOO_LARGE` |
//! | `InvalidBodyContent` | 422 | `INVALID_BODY_CONTENT` |
//! | `Server` | 500 | `SERVER_ERROR` |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request itself is malformed or could not be constructed.
    InvalidRequest,
    /// The targeted resource type or instance does not exist.
    NotFound,
    /// The resolved method is not allowed for the resolved resource.
    MethodNotAllowed,
    /// The submitted payload exceeds the configured limit.
    PayloadTooLarge,
    /// The submitted payload could not be decoded.
    InvalidBodyContent,
    /// Internal failures (e.g. link-builder construction).
    Server,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidBodyContent => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code for this category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InvalidBodyContent => "INVALID_BODY_CONTENT",
            Self::Server => "SERVER_ERROR",
        }
    }
}

/// Standard error type for apiop.
///
/// # Example
///
/// ```
/// use apiop_core::{ApiError, ErrorCategory};
/// use http::StatusCode;
///
/// let err = ApiError::method_not_allowed("PATCH");
/// assert_eq!(err.category(), ErrorCategory::MethodNotAllowed);
/// assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
/// assert!(err.to_string().contains("PATCH"));
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is malformed or could not be synthesized.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Resource type or instance not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The resource type that was being resolved.
        resource_type: Option<String>,
    },

    /// The method is not permitted for the resource.
    #[error("Method not allowed: {message}")]
    MethodNotAllowed {
        /// Human-readable error message.
        message: String,
        /// The rejected method.
        method: String,
    },

    /// Payload exceeds the configured limit.
    #[error("Payload too large: {message}")]
    PayloadTooLarge {
        /// Human-readable error message.
        message: String,
    },

    /// Payload could not be decoded.
    #[error("Invalid body content: {message}")]
    InvalidBodyContent {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Server error: {message}")]
    ServerError {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
        }
    }

    /// Creates a not found error for an unknown resource type.
    #[must_use]
    pub fn unknown_type(resource_type: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        Self::NotFound {
            message: format!("unknown resource type '{resource_type}'"),
            resource_type: Some(resource_type),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        let method = method.into();
        Self::MethodNotAllowed {
            message: format!("Method {method} not supported"),
            method,
        }
    }

    /// Creates a payload too large error.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self::PayloadTooLarge {
            message: format!("max {max_size} bytes, got {actual_size} bytes"),
        }
    }

    /// Creates an invalid body content error.
    #[must_use]
    pub fn invalid_body_content(message: impl Into<String>) -> Self {
        Self::InvalidBodyContent {
            message: message.into(),
        }
    }

    /// Creates a server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a server error with a source error.
    pub fn server_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::ServerError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::InvalidRequest,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::PayloadTooLarge { .. } => ErrorCategory::PayloadTooLarge,
            Self::InvalidBodyContent { .. } => ErrorCategory::InvalidBodyContent,
            Self::ServerError { .. } => ErrorCategory::Server,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.category().code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound {
                resource_type: Some(rt),
                ..
            } => Some(serde_json::json!({ "resource_type": rt })),
            Self::MethodNotAllowed { method, .. } => Some(serde_json::json!({ "method": method })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
