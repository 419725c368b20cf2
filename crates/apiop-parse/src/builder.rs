//! Link-builder construction.

use apiop_core::{ApiError, SchemaRegistry, UrlBuilder};
use bytes::Bytes;
use http::uri::Authority;
use http::{header, Request};
use std::fmt;
use std::sync::Arc;

/// Header carrying the client-facing scheme behind a proxy.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Header carrying the client-facing host behind a proxy.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Host used when the request names none.
pub const DEFAULT_HOST: &str = "localhost";

/// Normalizes a path prefix to `""` or `/segment[/segment...]`.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Joins path segments under a prefix.
///
/// # Example
///
/// ```rust
/// use apiop_parse::PathResolver;
///
/// let resolver = PathResolver::new("/v1/");
/// assert_eq!(resolver.prefix(), "/v1");
/// assert_eq!(resolver.resolve(&["clusters", "c1"]), "/v1/clusters/c1");
/// assert_eq!(resolver.resolve(&["clusters", "my cluster"]), "/v1/clusters/my%20cluster");
/// assert_eq!(PathResolver::new("").resolve(&[]), "/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    prefix: String,
}

impl PathResolver {
    /// Creates a resolver for `prefix`.
    #[must_use]
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: normalize_prefix(prefix.as_ref()),
        }
    }

    /// Returns the normalized prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the path of `segments` under the prefix.
    ///
    /// Each segment is percent-encoded; the prefix is used as is.
    #[must_use]
    pub fn resolve(&self, segments: &[&str]) -> String {
        let mut path = self.prefix.clone();
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }
}

/// Creates the link-builder attached to an operation.
pub trait UrlBuilderFactory: Send + Sync {
    /// Builds a link-builder for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL can be derived from the request.
    fn build(
        &self,
        request: &Request<Bytes>,
        resolver: &PathResolver,
        schemas: Option<Arc<dyn SchemaRegistry>>,
    ) -> Result<Arc<dyn UrlBuilder>, ApiError>;
}

/// Builds [`DefaultUrlBuilder`]s.
///
/// The base URL is `scheme://host`:
///
/// - scheme: `X-Forwarded-Proto` (when trusted), the request URI scheme, then
///   `default_scheme`
/// - host: `X-Forwarded-Host` (when trusted), the `Host` header, the request
///   URI authority, then `default_host` ([`DEFAULT_HOST`] unless changed)
///
/// A host that is present but not a valid authority is a server error.
#[derive(Debug, Clone)]
pub struct DefaultUrlBuilderFactory {
    trust_forwarded_headers: bool,
    default_scheme: String,
    default_host: String,
}

impl DefaultUrlBuilderFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(trust_forwarded_headers: bool, default_scheme: impl Into<String>) -> Self {
        Self {
            trust_forwarded_headers,
            default_scheme: default_scheme.into(),
            default_host: DEFAULT_HOST.to_string(),
        }
    }

    /// Sets the host used when the request names none.
    #[must_use]
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    fn scheme(&self, request: &Request<Bytes>) -> String {
        if self.trust_forwarded_headers {
            if let Some(proto) = first_value(request, X_FORWARDED_PROTO) {
                return proto.to_lowercase();
            }
        }
        request
            .uri()
            .scheme_str()
            .unwrap_or(&self.default_scheme)
            .to_string()
    }

    fn host<'a>(&self, request: &'a Request<Bytes>) -> Option<&'a str> {
        let forwarded = if self.trust_forwarded_headers {
            first_value(request, X_FORWARDED_HOST)
        } else {
            None
        };

        forwarded
            .or_else(|| first_value(request, header::HOST.as_str()))
            .or_else(|| request.uri().authority().map(Authority::as_str))
    }
}

impl Default for DefaultUrlBuilderFactory {
    fn default() -> Self {
        Self::new(true, "http")
    }
}

impl UrlBuilderFactory for DefaultUrlBuilderFactory {
    fn build(
        &self,
        request: &Request<Bytes>,
        resolver: &PathResolver,
        schemas: Option<Arc<dyn SchemaRegistry>>,
    ) -> Result<Arc<dyn UrlBuilder>, ApiError> {
        let host = self.host(request).unwrap_or(self.default_host.as_str());
        let authority: Authority = host.parse().map_err(|e| {
            ApiError::server_with_source(format!("invalid host '{host}'"), e)
        })?;

        let base = format!("{}://{}", self.scheme(request), authority);
        let current_path = request
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());

        Ok(Arc::new(DefaultUrlBuilder {
            current: format!("{base}{current_path}"),
            base,
            resolver: resolver.clone(),
            schemas,
        }))
    }
}

fn first_value<'a>(request: &'a Request<Bytes>, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Absolute-URL link-builder.
///
/// Type segments use the registered plural name (`policy` -> `policies`);
/// unregistered types are used as given.
///
/// # Example
///
/// ```rust
/// use apiop_core::{fixtures, SchemaRegistry, UrlBuilder};
/// use apiop_parse::{DefaultUrlBuilderFactory, PathResolver, UrlBuilderFactory};
/// use bytes::Bytes;
/// use http::Request;
/// use std::sync::Arc;
///
/// let request = Request::get("/v1/policies")
///     .header("host", "api.example.com")
///     .body(Bytes::new())
///     .unwrap();
/// let schemas: Arc<dyn SchemaRegistry> = fixtures::shared_cluster_schemas();
///
/// let builder = DefaultUrlBuilderFactory::default()
///     .build(&request, &PathResolver::new("/v1"), Some(schemas))
///     .unwrap();
///
/// assert_eq!(builder.current(), "http://api.example.com/v1/policies");
/// assert_eq!(builder.resource("policy", "p1"), "http://api.example.com/v1/policies/p1");
/// ```
pub struct DefaultUrlBuilder {
    base: String,
    current: String,
    resolver: PathResolver,
    schemas: Option<Arc<dyn SchemaRegistry>>,
}

impl DefaultUrlBuilder {
    /// Returns the `scheme://host` base of every link.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn plural(&self, type_name: &str) -> String {
        self.schemas
            .as_ref()
            .and_then(|schemas| schemas.schema(type_name))
            .map_or_else(|| type_name.to_string(), |schema| schema.plural_name().to_string())
    }

    fn url(&self, segments: &[&str]) -> String {
        format!("{}{}", self.base, self.resolver.resolve(segments))
    }
}

impl fmt::Debug for DefaultUrlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultUrlBuilder")
            .field("base", &self.base)
            .field("current", &self.current)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl UrlBuilder for DefaultUrlBuilder {
    fn current(&self) -> String {
        self.current.clone()
    }

    fn collection(&self, type_name: &str) -> String {
        let plural = self.plural(type_name);
        self.url(&[plural.as_str()])
    }

    fn resource(&self, type_name: &str, name: &str) -> String {
        let plural = self.plural(type_name);
        self.url(&[plural.as_str(), name])
    }

    fn link(&self, type_name: &str, name: &str, link: &str) -> String {
        let plural = self.plural(type_name);
        self.url(&[plural.as_str(), name, link])
    }

    fn action(&self, type_name: &str, name: &str, action: &str) -> String {
        format!(
            "{}?action={}",
            self.resource(type_name, name),
            urlencoding::encode(action)
        )
    }
}
