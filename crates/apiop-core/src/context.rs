//! Request-scoped access to the in-flight operation.
//!
//! The normalizer owns the [`ApiOperation`](crate::ApiOperation) and passes it
//! by `&mut`. Collaborators that only see the `http::Request` (URL parsers,
//! handlers further down the stack) read a snapshot of it from the request's
//! typed extension map under one well-known key, [`CurrentOperation`].

use crate::operation::ResponseFormat;
use http::Extensions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for each operation, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use apiop_core::RequestId;
///
/// let id = RequestId::new();
/// assert_ne!(id, RequestId::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable snapshot of an operation's resolved fields.
///
/// Empty strings and `None` mean "not resolved yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationView {
    /// Identifier of the operation this view was taken from.
    pub request_id: RequestId,
    /// Resource type.
    pub type_name: String,
    /// Resource instance name.
    pub name: String,
    /// Link relation.
    pub link: String,
    /// Effective HTTP method.
    pub method: Option<String>,
    /// Action identifier.
    pub action: String,
    /// Path prefix used for link generation.
    pub url_prefix: String,
    /// Negotiated response format.
    pub response_format: Option<ResponseFormat>,
}

/// The well-known extension key holding the current [`OperationView`].
#[derive(Debug, Clone)]
pub struct CurrentOperation(pub Arc<OperationView>);

/// Returns the operation bound to a request's extensions, if any.
///
/// Absence is a valid outcome: requests that never went through the
/// normalizer simply carry no binding.
///
/// # Example
///
/// ```
/// use apiop_core::{current_operation, ApiOperation};
///
/// let request = http::Request::new(bytes::Bytes::new());
/// assert!(current_operation(request.extensions()).is_none());
///
/// let mut op = ApiOperation::new().with_request(request);
/// op.type_name = "node".to_string();
/// op.bind_context();
///
/// let view = current_operation(op.context().unwrap()).unwrap();
/// assert_eq!(view.type_name, "node");
/// ```
#[must_use]
pub fn current_operation(extensions: &Extensions) -> Option<&OperationView> {
    extensions
        .get::<CurrentOperation>()
        .map(|current| current.0.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_display_roundtrip() {
        let id = RequestId::new();
        let parsed: Uuid = id.to_string().parse().unwrap();
        assert_eq!(RequestId::from_uuid(parsed), id);
    }

    #[test]
    fn test_absent_binding() {
        let extensions = Extensions::new();
        assert!(current_operation(&extensions).is_none());
    }

    #[test]
    fn test_rebinding_replaces_view() {
        let mut extensions = Extensions::new();
        extensions.insert(CurrentOperation(Arc::new(OperationView {
            type_name: "first".to_string(),
            ..Default::default()
        })));
        extensions.insert(CurrentOperation(Arc::new(OperationView {
            type_name: "second".to_string(),
            ..Default::default()
        })));

        assert_eq!(current_operation(&extensions).unwrap().type_name, "second");
    }
}
