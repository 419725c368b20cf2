//! Effective HTTP method resolution.

use apiop_core::QueryValues;
use http::Request;

/// Query parameter overriding the transport-level method.
pub const METHOD_PARAM: &str = "_method";

/// Returns the effective method of `request`.
///
/// A non-empty `_method` query value wins over the transport method. The
/// override is not checked against any known set of methods here.
///
/// # Example
///
/// ```rust
/// use apiop_parse::resolve_method;
/// use http::Request;
///
/// let request = Request::get("/clusters/c1?_method=DELETE").body(()).unwrap();
/// assert_eq!(resolve_method(&request), "DELETE");
///
/// let request = Request::put("/clusters/c1").body(()).unwrap();
/// assert_eq!(resolve_method(&request), "PUT");
/// ```
#[must_use]
pub fn resolve_method<B>(request: &Request<B>) -> String {
    resolve_method_with(request, METHOD_PARAM)
}

/// Like [`resolve_method`], reading the override from `param`.
#[must_use]
pub fn resolve_method_with<B>(request: &Request<B>, param: &str) -> String {
    let query = QueryValues::from_uri(request.uri());
    match query.get(param) {
        Some(method) if !method.is_empty() => method.to_string(),
        _ => request.method().as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request<()> {
        Request::get(uri).body(()).unwrap()
    }

    #[test]
    fn test_transport_method() {
        assert_eq!(resolve_method(&get("/nodes")), "GET");
    }

    #[test]
    fn test_override() {
        assert_eq!(resolve_method(&get("/nodes?_method=POST")), "POST");
    }

    #[test]
    fn test_empty_override_ignored() {
        assert_eq!(resolve_method(&get("/nodes?_method=")), "GET");
    }

    #[test]
    fn test_first_override_wins() {
        assert_eq!(resolve_method(&get("/nodes?_method=PUT&_method=DELETE")), "PUT");
    }

    #[test]
    fn test_override_not_validated() {
        assert_eq!(resolve_method(&get("/nodes?_method=FROB")), "FROB");
    }

    #[test]
    fn test_custom_param() {
        let request = get("/nodes?verb=DELETE&_method=PUT");
        assert_eq!(resolve_method_with(&request, "verb"), "DELETE");
    }
}
