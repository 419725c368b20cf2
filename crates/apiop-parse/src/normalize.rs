//! The operation normalizer.

use apiop_core::metric_names::OPERATIONS_TOTAL;
use apiop_core::{ApiError, ApiOperation, CurrentOperation};
use bytes::Bytes;
use http::Request;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::builder::{DefaultUrlBuilderFactory, PathResolver, UrlBuilderFactory};
use crate::format::{resolve_format_with, FORMAT_PARAM};
use crate::method::{resolve_method_with, METHOD_PARAM};
use crate::url::UrlParser;
use crate::validate::validate_method;

/// Tunables for [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Query parameter overriding the method.
    pub method_param: String,
    /// Query parameter forcing the response format.
    pub format_param: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            method_param: METHOD_PARAM.to_string(),
            format_param: FORMAT_PARAM.to_string(),
        }
    }
}

/// Fills in an [`ApiOperation`] from its request.
///
/// Fields the caller already set are never overwritten. The response format
/// is always resolved before anything can fail.
///
/// Errors surface in a fixed order:
///
/// 1. the request could not be synthesized
/// 2. the link-builder could not be built
/// 3. the URL parser's error, after its partial result has been merged
/// 4. the method is not permitted for the schema
///
/// # Example
///
/// ```rust
/// use apiop_core::{fixtures, ApiOperation, ResponseFormat};
/// use apiop_parse::{DefaultUrlParser, Normalizer};
/// use bytes::Bytes;
/// use http::Request;
///
/// let request = Request::post("/v1/clusters")
///     .header("host", "api.example.com")
///     .body(Bytes::new())
///     .unwrap();
/// let mut op = ApiOperation::new()
///     .with_request(request)
///     .with_schemas(fixtures::shared_cluster_schemas());
///
/// Normalizer::new()
///     .normalize(&mut op, &DefaultUrlParser::new("/v1"))
///     .unwrap();
///
/// assert_eq!(op.type_name, "cluster");
/// assert_eq!(op.method.as_deref(), Some("POST"));
/// assert_eq!(op.response_format, Some(ResponseFormat::Json));
/// assert_eq!(op.url_prefix, "/v1");
/// ```
#[derive(Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    builder_factory: Arc<dyn UrlBuilderFactory>,
}

impl Normalizer {
    /// Creates a normalizer with default parameters and link-builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: NormalizerConfig::default(),
            builder_factory: Arc::new(DefaultUrlBuilderFactory::default()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: NormalizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the link-builder factory.
    #[must_use]
    pub fn with_builder_factory(mut self, factory: Arc<dyn UrlBuilderFactory>) -> Self {
        self.builder_factory = factory;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes `op` using `parser` for the URL.
    ///
    /// # Errors
    ///
    /// See the type-level documentation for the order errors surface in.
    pub fn normalize(&self, op: &mut ApiOperation, parser: &dyn UrlParser) -> Result<(), ApiError> {
        let mut request = match op.request.take() {
            Some(request) => request,
            None => Request::get("/").body(Bytes::new()).map_err(|e| {
                ApiError::invalid_request(format!("failed to create default request: {e}"))
            })?,
        };

        let result = self.run(op, &mut request, parser);

        op.request = Some(request);
        op.bind_context();

        let format = op.response_format.map_or("none", |format| format.as_str());
        let outcome = match &result {
            Ok(()) => "ok",
            Err(error) => error.category().code(),
        };
        metrics::counter!(OPERATIONS_TOTAL, "format" => format, "outcome" => outcome).increment(1);

        result
    }

    fn run(
        &self,
        op: &mut ApiOperation,
        request: &mut Request<Bytes>,
        parser: &dyn UrlParser,
    ) -> Result<(), ApiError> {
        bind(op, request);

        if op.method.is_none() {
            op.method = Some(resolve_method_with(&*request, &self.config.method_param));
        }
        if op.response_format.is_none() {
            op.response_format = Some(resolve_format_with(&*request, &self.config.format_param));
        }
        bind(op, request);
        debug!(
            request_id = %op.id,
            method = op.method_str(),
            format = ?op.response_format,
            "method and format resolved"
        );

        let attempt = parser.parse(&mut op.response_headers, &*request, op.schemas.as_deref());
        attempt.populate(op);
        bind(op, request);
        if let Some(error) = attempt.error() {
            debug!(request_id = %op.id, %error, "url parse failed, partial result merged");
        }

        if op.url_builder.is_none() {
            let resolver = PathResolver::new(&op.url_prefix);
            let builder = self
                .builder_factory
                .build(&*request, &resolver, op.schemas.clone())
                .map_err(|error| {
                    warn!(request_id = %op.id, %error, "failed to build url builder");
                    error
                })?;
            op.url_builder = Some(builder);
        }

        attempt.commit().map_err(|error| {
            warn!(request_id = %op.id, %error, "url parse failed");
            error
        })?;

        if op.schema.is_none() {
            op.schema = op
                .schemas
                .as_ref()
                .and_then(|schemas| schemas.schema(&op.type_name));
        }
        if let Some(schema) = &op.schema {
            if op.type_name.is_empty() {
                op.type_name = schema.id().to_string();
            }
        }

        validate_method(op).map_err(|error| {
            warn!(request_id = %op.id, %error, "method rejected");
            error
        })?;

        debug!(
            request_id = %op.id,
            type_name = %op.type_name,
            name = %op.name,
            link = %op.link,
            action = %op.action,
            "operation normalized"
        );
        Ok(())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn bind(op: &ApiOperation, request: &mut Request<Bytes>) {
    request
        .extensions_mut()
        .insert(CurrentOperation(Arc::new(op.view())));
}

/// Normalizes `op` with the default [`Normalizer`].
///
/// # Errors
///
/// See [`Normalizer::normalize`].
pub fn parse(op: &mut ApiOperation, parser: &dyn UrlParser) -> Result<(), ApiError> {
    Normalizer::new().normalize(op, parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::{url_parser_fn, DefaultUrlParser, ParseAttempt, ParsedUrl};
    use apiop_core::{current_operation, fixtures, ErrorCategory, ResponseFormat};

    #[test]
    fn test_synthesizes_request() {
        let mut op = ApiOperation::new();
        parse(&mut op, &DefaultUrlParser::default()).unwrap();

        let request = op.request.as_ref().unwrap();
        assert_eq!(request.method(), http::Method::GET);
        assert_eq!(request.uri().path(), "/");
        assert_eq!(op.method.as_deref(), Some("GET"));
        assert_eq!(op.response_format, Some(ResponseFormat::Json));
        assert!(op.url_builder.is_some());
    }

    #[test]
    fn test_context_bound_after_normalize() {
        let mut op = ApiOperation::new().with_schemas(fixtures::shared_cluster_schemas());
        op.request = Some(Request::get("/nodes/n1").body(Bytes::new()).unwrap());
        parse(&mut op, &DefaultUrlParser::default()).unwrap();

        let view = current_operation(op.context().unwrap()).unwrap();
        assert_eq!(view.request_id, op.id);
        assert_eq!(view.type_name, "node");
        assert_eq!(view.name, "n1");
        assert_eq!(view.method.as_deref(), Some("GET"));
    }

    #[test]
    fn test_parser_sees_bound_context() {
        let parser = url_parser_fn(|_response, request, _schemas| {
            let view = current_operation(request.extensions()).cloned().unwrap_or_default();
            ParseAttempt::ok(ParsedUrl {
                type_name: format!("seen-{}", view.method.unwrap_or_default()),
                ..Default::default()
            })
        });

        let mut op = ApiOperation::new();
        op.request = Some(Request::put("/").body(Bytes::new()).unwrap());
        parse(&mut op, &parser).unwrap();

        assert_eq!(op.type_name, "seen-PUT");
    }

    #[test]
    fn test_custom_params() {
        let normalizer = Normalizer::new().with_config(NormalizerConfig {
            method_param: "verb".to_string(),
            format_param: "fmt".to_string(),
        });
        let mut op = ApiOperation::new();
        op.request = Some(
            Request::get("/?verb=DELETE&fmt=yaml&_method=PUT")
                .body(Bytes::new())
                .unwrap(),
        );

        normalizer
            .normalize(&mut op, &DefaultUrlParser::default())
            .unwrap();

        assert_eq!(op.method.as_deref(), Some("DELETE"));
        assert_eq!(op.response_format, Some(ResponseFormat::Yaml));
    }

    #[test]
    fn test_schema_sets_type_name() {
        let parser = url_parser_fn(|_response, _request, _schemas| ParseAttempt::default());
        let mut op = ApiOperation::new().with_schemas(fixtures::shared_cluster_schemas());
        op.schema = Some(Arc::new(fixtures::policy_schema()));

        parse(&mut op, &parser).unwrap();
        assert_eq!(op.type_name, "policy");
    }

    #[test]
    fn test_method_rejected_last() {
        let mut op = ApiOperation::new().with_schemas(fixtures::shared_cluster_schemas());
        op.request = Some(Request::delete("/clusters").body(Bytes::new()).unwrap());

        let err = parse(&mut op, &DefaultUrlParser::default()).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::MethodNotAllowed);
        assert_eq!(op.type_name, "cluster");
        assert!(op.schema.is_some());
    }
}
