//! Wires a loaded [`ApiOpConfig`] into the normalizer and body extractor.

use std::sync::Arc;

use apiop_config::ApiOpConfig;
use apiop_core::{ApiError, ApiObject, ApiOperation};
use apiop_extract::{extract_body_with_limit, BodyReader, DecodingBodyReader};
use apiop_parse::{
    DefaultUrlBuilderFactory, DefaultUrlParser, Normalizer, NormalizerConfig, UrlParser,
};
use bytes::Bytes;
use http::Request;
use tracing::debug;

/// A configured normalizer, URL parser and body reader.
///
/// # Example
///
/// ```rust
/// use apiop::{ApiOp, ApiOpConfig};
/// use apiop_core::{fixtures, ApiOperation};
/// use bytes::Bytes;
/// use http::Request;
///
/// let mut config = ApiOpConfig::default();
/// config.parse.url_prefix = "/v1".to_string();
/// let apiop = ApiOp::from_config(&config);
///
/// let request = Request::get("/v1/clusters/c1").body(Bytes::new()).unwrap();
/// let mut op = ApiOperation::new()
///     .with_request(request)
///     .with_schemas(fixtures::shared_cluster_schemas());
///
/// apiop.normalize(&mut op).unwrap();
/// assert_eq!(op.type_name, "cluster");
/// assert_eq!(op.name, "c1");
/// ```
#[derive(Clone)]
pub struct ApiOp {
    normalizer: Normalizer,
    parser: Arc<dyn UrlParser>,
    reader: Arc<dyn BodyReader>,
    max_form_size: usize,
}

impl ApiOp {
    /// Builds the pipeline from configuration.
    #[must_use]
    pub fn from_config(config: &ApiOpConfig) -> Self {
        let factory = DefaultUrlBuilderFactory::new(
            config.url_builder.trust_forwarded_headers,
            config.url_builder.default_scheme.clone(),
        )
        .with_default_host(config.url_builder.default_host.clone());

        let normalizer = Normalizer::new()
            .with_config(NormalizerConfig {
                method_param: config.parse.method_param.clone(),
                format_param: config.parse.format_param.clone(),
            })
            .with_builder_factory(Arc::new(factory));

        debug!(
            url_prefix = %config.parse.url_prefix,
            max_form_size = config.parse.max_form_size,
            "request pipeline configured"
        );

        Self {
            normalizer,
            parser: Arc::new(DefaultUrlParser::new(&config.parse.url_prefix)),
            reader: Arc::new(DecodingBodyReader::new(config.parse.max_form_size)),
            max_form_size: config.parse.max_form_size,
        }
    }

    /// Replaces the URL parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn UrlParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the fallback body reader.
    #[must_use]
    pub fn with_reader(mut self, reader: Arc<dyn BodyReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Returns the normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Normalizes `op` with the configured parser.
    ///
    /// # Errors
    ///
    /// See [`Normalizer::normalize`].
    pub fn normalize(&self, op: &mut ApiOperation) -> Result<(), ApiError> {
        self.normalizer.normalize(op, self.parser.as_ref())
    }

    /// Extracts the body of `request` with the configured size limit.
    ///
    /// # Errors
    ///
    /// Returns the reader's error converted to an [`ApiError`].
    pub async fn extract_body(&self, request: &Request<Bytes>) -> Result<ApiObject, ApiError> {
        let body = extract_body_with_limit(request, self.reader.as_ref(), self.max_form_size).await?;
        Ok(body)
    }
}

impl Default for ApiOp {
    fn default() -> Self {
        Self::from_config(&ApiOpConfig::default())
    }
}

impl std::fmt::Debug for ApiOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiOp")
            .field("normalizer", &self.normalizer)
            .field("max_form_size", &self.max_form_size)
            .finish_non_exhaustive()
    }
}
