//! URL-encoded form collection.
//!
//! Only `application/x-www-form-urlencoded` bodies on `POST`, `PUT` and
//! `PATCH` count as form submissions. The collected map lists the body's
//! values for a key first, followed by any query-string values for the same
//! key.

use apiop_core::QueryValues;
use bytes::Bytes;
use http::{header, Method, Request};
use std::collections::HashMap;

use crate::{ExtractionError, ExtractionSource};

/// Returns `true` if `request` carries a URL-encoded form body.
#[must_use]
pub fn is_form_request(request: &Request<Bytes>) -> bool {
    if !matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }

    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
}

/// Collects the URL-encoded form values of `request`.
///
/// Returns `Ok(None)` when the request is not a form submission or its body
/// holds no values, so the caller can fall through to the next strategy.
///
/// # Errors
///
/// Returns an error if the body exceeds `limit` or is not valid
/// URL-encoded data.
///
/// # Example
///
/// ```rust
/// use apiop_extract::form_values;
/// use bytes::Bytes;
/// use http::Request;
///
/// let request = Request::post("/clusters?a=3")
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body(Bytes::from_static(b"a=1&a=2"))
///     .unwrap();
///
/// let values = form_values(&request, 1024).unwrap().unwrap();
/// assert_eq!(values["a"], vec!["1", "2", "3"]);
/// ```
pub fn form_values(
    request: &Request<Bytes>,
    limit: usize,
) -> Result<Option<HashMap<String, Vec<String>>>, ExtractionError> {
    if !is_form_request(request) {
        return Ok(None);
    }

    let body = request.body();
    if body.len() > limit {
        return Err(ExtractionError::payload_too_large(
            ExtractionSource::Form,
            limit,
            body.len(),
        ));
    }

    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Form, e.to_string()))?;
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs {
        values.entry(key).or_default().push(value);
    }

    for (key, query_values) in QueryValues::from_uri(request.uri()).iter() {
        values
            .entry(key.to_owned())
            .or_default()
            .extend(query_values.iter().cloned());
    }

    Ok(Some(values))
}
