//! Method validation against the resolved schema.

use apiop_core::{ApiError, ApiOperation};
use http::Method;

/// Methods an operation may resolve to.
pub const SUPPORTED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// Checks that the operation's method is permitted.
///
/// - An action invoked with `POST` is always allowed.
/// - Anything outside [`SUPPORTED_METHODS`] is rejected.
/// - Operations without a type or schema, and link operations, are allowed.
/// - Otherwise the schema's resource methods (named resource) or collection
///   methods (no name) must include the method.
///
/// # Errors
///
/// Returns [`ApiError::MethodNotAllowed`] when the method is not permitted.
///
/// # Example
///
/// ```rust
/// use apiop_core::{fixtures, ApiOperation};
/// use apiop_parse::validate_method;
/// use std::sync::Arc;
///
/// let mut op = ApiOperation::new();
/// op.type_name = "node".to_string();
/// op.schema = Some(Arc::new(fixtures::node_schema()));
/// op.method = Some("GET".to_string());
/// assert!(validate_method(&op).is_ok());
///
/// op.method = Some("POST".to_string());
/// assert!(validate_method(&op).is_err());
/// ```
pub fn validate_method(op: &ApiOperation) -> Result<(), ApiError> {
    let method_name = op.method_str();

    if !op.action.is_empty() && method_name == Method::POST.as_str() {
        return Ok(());
    }

    let Some(method) = SUPPORTED_METHODS
        .iter()
        .find(|supported| supported.as_str() == method_name)
    else {
        return Err(ApiError::method_not_allowed(method_name));
    };

    let Some(schema) = op.schema.as_deref() else {
        return Ok(());
    };
    if op.type_name.is_empty() || !op.link.is_empty() {
        return Ok(());
    }

    let allowed = if op.name.is_empty() {
        schema.allows_collection(method)
    } else {
        schema.allows_resource(method)
    };

    if allowed {
        Ok(())
    } else {
        Err(ApiError::method_not_allowed(method_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiop_core::{fixtures, ErrorCategory};
    use std::sync::Arc;

    fn cluster_op(name: &str, method: &str) -> ApiOperation {
        let mut op = ApiOperation::new();
        op.type_name = "cluster".to_string();
        op.name = name.to_string();
        op.method = Some(method.to_string());
        op.schema = Some(Arc::new(fixtures::cluster_schema()));
        op
    }

    #[test]
    fn test_collection_methods() {
        assert!(validate_method(&cluster_op("", "GET")).is_ok());
        assert!(validate_method(&cluster_op("", "POST")).is_ok());
        assert!(validate_method(&cluster_op("", "DELETE")).is_err());
    }

    #[test]
    fn test_resource_methods() {
        assert!(validate_method(&cluster_op("c1", "PUT")).is_ok());
        assert!(validate_method(&cluster_op("c1", "DELETE")).is_ok());
        assert!(validate_method(&cluster_op("c1", "POST")).is_err());
    }

    #[test]
    fn test_unsupported_method() {
        let mut op = ApiOperation::new();
        op.method = Some("PATCH".to_string());

        let err = validate_method(&op).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MethodNotAllowed);
        assert_eq!(err.to_string(), "Method not allowed: Method PATCH not supported");
    }

    #[test]
    fn test_unresolved_method_rejected() {
        assert!(validate_method(&ApiOperation::new()).is_err());
    }

    #[test]
    fn test_action_post_always_allowed() {
        let mut op = cluster_op("c1", "POST");
        op.action = "restart".to_string();
        assert!(validate_method(&op).is_ok());
    }

    #[test]
    fn test_link_skips_schema_check() {
        let mut op = cluster_op("c1", "POST");
        op.link = "nodes".to_string();
        assert!(validate_method(&op).is_ok());
    }

    #[test]
    fn test_no_schema_allows_supported() {
        let mut op = ApiOperation::new();
        op.type_name = "widget".to_string();
        op.method = Some("DELETE".to_string());
        assert!(validate_method(&op).is_ok());
    }
}
