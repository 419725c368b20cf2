//! Body extraction entry point.

use apiop_core::metric_names::BODY_SOURCE_TOTAL;
use apiop_core::ApiObject;
use bytes::Bytes;
use http::Request;
use tracing::debug;

use crate::form::form_values;
use crate::multipart::{multipart_values, MultipartConfig, MAX_FORM_SIZE};
use crate::reader::BodyReader;
use crate::ExtractionError;

/// Extracts the submitted payload of `request` with the default 2 MiB form limit.
///
/// See [`extract_body_with_limit`].
///
/// # Errors
///
/// Returns whatever `reader` returns when neither a multipart nor a form
/// payload is present.
pub async fn extract_body(
    request: &Request<Bytes>,
    reader: &dyn BodyReader,
) -> Result<ApiObject, ExtractionError> {
    extract_body_with_limit(request, reader, MAX_FORM_SIZE).await
}

/// Extracts the submitted payload of `request`.
///
/// Strategies run in order and the first one producing values wins:
///
/// 1. `multipart/form-data` bounded by `max_form_size`. Parse failures are
///    logged and skipped; an empty value map falls through.
/// 2. A URL-encoded form body (body values, then query values per key).
///    Failures are logged and skipped.
/// 3. `reader`, whose result is returned unchanged.
///
/// # Errors
///
/// Only the fallback reader can fail the extraction.
///
/// # Example
///
/// ```rust
/// use apiop_extract::{extract_body_with_limit, DecodingBodyReader};
/// use bytes::Bytes;
/// use http::Request;
///
/// # tokio_test::block_on(async {
/// let request = Request::post("/nodes")
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body(Bytes::from_static(b"name=n1"))
///     .unwrap();
///
/// let body = extract_body_with_limit(&request, &DecodingBodyReader::default(), 1024)
///     .await
///     .unwrap();
/// assert_eq!(body.values("name"), Some(vec!["n1"]));
/// # });
/// ```
pub async fn extract_body_with_limit(
    request: &Request<Bytes>,
    reader: &dyn BodyReader,
    max_form_size: usize,
) -> Result<ApiObject, ExtractionError> {
    let config = MultipartConfig::new().max_body_size(max_form_size);
    match multipart_values(request.headers(), request.body().clone(), config).await {
        Ok(values) if !values.is_empty() => {
            debug!(fields = values.len(), "body extracted from multipart form");
            metrics::counter!(BODY_SOURCE_TOTAL, "source" => "multipart").increment(1);
            return Ok(ApiObject::from_values(values));
        }
        Ok(_) => {}
        Err(error) => debug!(%error, "multipart parse skipped"),
    }

    match form_values(request, max_form_size) {
        Ok(Some(values)) => {
            debug!(fields = values.len(), "body extracted from form");
            metrics::counter!(BODY_SOURCE_TOTAL, "source" => "form").increment(1);
            return Ok(ApiObject::from_values(values));
        }
        Ok(None) => {}
        Err(error) => debug!(%error, "form parse skipped"),
    }

    metrics::counter!(BODY_SOURCE_TOTAL, "source" => "raw").increment(1);
    reader.read_body(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DecodingBodyReader;
    use crate::ExtractionSource;
    use http::header;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn multipart_request(body: &'static str) -> Request<Bytes> {
        Request::post("/clusters?a=9")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XyZ")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_multipart_wins() {
        let request = multipart_request(
            "--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
             --XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n2\r\n--XyZ--\r\n",
        );
        let calls = AtomicUsize::new(0);
        let reader = |_: &Request<Bytes>| -> Result<ApiObject, ExtractionError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(ApiObject::new())
        };

        let body = extract_body(&request, &reader).await.unwrap();

        assert_eq!(body.into_value(), json!({"a": ["1", "2"]}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_multipart_falls_through() {
        let request = multipart_request("garbage");
        let reader = |_: &Request<Bytes>| -> Result<ApiObject, ExtractionError> {
            let mut map = serde_json::Map::new();
            map.insert("fallback".to_string(), json!(true));
            Ok(ApiObject::from(map))
        };

        let body = extract_body(&request, &reader).await.unwrap();
        assert_eq!(body["fallback"], json!(true));
    }

    #[tokio::test]
    async fn test_form_values() {
        let request = Request::post("/nodes?tag=q")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Bytes::from_static(b"tag=b&name=n1"))
            .unwrap();

        let body = extract_body(&request, &DecodingBodyReader::default())
            .await
            .unwrap();

        assert_eq!(body.into_value(), json!({"tag": ["b", "q"], "name": ["n1"]}));
    }

    #[tokio::test]
    async fn test_raw_json_body() {
        let request = Request::put("/clusters/c1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(br#"{"size": 3}"#))
            .unwrap();

        let body = extract_body(&request, &DecodingBodyReader::default())
            .await
            .unwrap();
        assert_eq!(body.into_value(), json!({"size": 3}));
    }

    #[tokio::test]
    async fn test_reader_error_returned_unchanged() {
        let request = Request::post("/clusters")
            .body(Bytes::from_static(b"{"))
            .unwrap();

        let err = extract_body(&request, &DecodingBodyReader::default())
            .await
            .unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.error_code(), "INVALID_BODY_CONTENT");
    }

    #[tokio::test]
    async fn test_oversized_multipart_falls_through() {
        let request = multipart_request(
            "--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n--XyZ--\r\n",
        );
        let reader = |_: &Request<Bytes>| -> Result<ApiObject, ExtractionError> { Ok(ApiObject::new()) };

        let body = extract_body_with_limit(&request, &reader, 8).await.unwrap();
        assert!(body.is_empty());
    }
}
