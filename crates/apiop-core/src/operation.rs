//! The per-request operation descriptor.

use crate::builder::UrlBuilder;
use crate::context::{CurrentOperation, OperationView, RequestId};
use crate::query::QueryValues;
use crate::schema::{Schema, SchemaRegistry};
use bytes::Bytes;
use http::{Extensions, HeaderMap, Request};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Response serialization format.
///
/// The set is closed: negotiation always lands on one of these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// HTML, for interactive browsers.
    Html,
    /// JSON, the default.
    Json,
    /// YAML.
    Yaml,
}

impl ResponseFormat {
    /// All recognized formats.
    pub const ALL: [Self; 3] = [Self::Html, Self::Json, Self::Yaml];

    /// Returns the format matching `name` exactly (`"html"`, `"json"`, `"yaml"`).
    ///
    /// # Example
    ///
    /// ```
    /// use apiop_core::ResponseFormat;
    ///
    /// assert_eq!(ResponseFormat::from_name("yaml"), Some(ResponseFormat::Yaml));
    /// assert_eq!(ResponseFormat::from_name("YAML"), None);
    /// assert_eq!(ResponseFormat::from_name("xml"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Returns the lowercase format name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Returns the MIME type a response in this format should carry.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical description of one inbound API request.
///
/// The caller creates the descriptor, optionally pre-populates fields, and
/// hands it to the normalizer, which fills in whatever is still unset and
/// never overwrites a populated field. An empty string or `None` means
/// "unset".
///
/// # Example
///
/// ```
/// use apiop_core::{ApiOperation, ResponseFormat};
///
/// let mut op = ApiOperation::new();
/// op.response_format = Some(ResponseFormat::Yaml);
///
/// assert!(op.request.is_none());
/// assert!(op.method.is_none());
/// assert_eq!(op.response_format, Some(ResponseFormat::Yaml));
/// ```
#[derive(Debug, Default)]
pub struct ApiOperation {
    /// Identifier used for log correlation.
    pub id: RequestId,
    /// Resource kind.
    pub type_name: String,
    /// Resource instance identifier.
    pub name: String,
    /// Named sub-resource or link relation.
    pub link: String,
    /// Effective HTTP method.
    pub method: Option<String>,
    /// Named action identifier.
    pub action: String,
    /// Path prefix used for link generation.
    pub url_prefix: String,
    /// Parsed query parameters.
    pub query: Option<QueryValues>,
    /// Negotiated response format.
    pub response_format: Option<ResponseFormat>,
    /// Additional path context extracted by the URL parser.
    pub sub_context: HashMap<String, String>,
    /// Resolved schema.
    pub schema: Option<Arc<Schema>>,
    /// Resolved link-builder.
    pub url_builder: Option<Arc<dyn UrlBuilder>>,
    /// Schema registry used for lookups.
    pub schemas: Option<Arc<dyn SchemaRegistry>>,
    /// The underlying request.
    pub request: Option<Request<Bytes>>,
    /// Headers the URL parser may set on the eventual response.
    pub response_headers: HeaderMap,
}

impl ApiOperation {
    /// Creates an empty descriptor with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the underlying request.
    #[must_use]
    pub fn with_request(mut self, request: Request<Bytes>) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches the schema registry.
    #[must_use]
    pub fn with_schemas(mut self, schemas: Arc<dyn SchemaRegistry>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    /// Returns the schema registry as a trait object reference.
    #[must_use]
    pub fn schemas(&self) -> Option<&dyn SchemaRegistry> {
        self.schemas.as_deref()
    }

    /// Returns the request's typed context, if a request is attached.
    #[must_use]
    pub fn context(&self) -> Option<&Extensions> {
        self.request.as_ref().map(Request::extensions)
    }

    /// Takes a snapshot of the resolved scalar fields.
    #[must_use]
    pub fn view(&self) -> OperationView {
        OperationView {
            request_id: self.id,
            type_name: self.type_name.clone(),
            name: self.name.clone(),
            link: self.link.clone(),
            method: self.method.clone(),
            action: self.action.clone(),
            url_prefix: self.url_prefix.clone(),
            response_format: self.response_format,
        }
    }

    /// Binds (or refreshes) this operation's snapshot in the request context.
    ///
    /// Does nothing when no request is attached.
    pub fn bind_context(&mut self) {
        let view = Arc::new(self.view());
        if let Some(request) = self.request.as_mut() {
            request.extensions_mut().insert(CurrentOperation(view));
        }
    }

    /// Returns the effective method, or an empty string when unresolved.
    #[must_use]
    pub fn method_str(&self) -> &str {
        self.method.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::current_operation;

    #[test]
    fn test_format_names() {
        for format in ResponseFormat::ALL {
            assert_eq!(ResponseFormat::from_name(format.as_str()), Some(format));
            assert_eq!(format.to_string(), format.as_str());
        }
    }

    #[test]
    fn test_format_serde() {
        let json = serde_json::to_string(&ResponseFormat::Yaml).unwrap();
        assert_eq!(json, "\"yaml\"");
        let parsed: ResponseFormat = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(parsed, ResponseFormat::Html);
    }

    #[test]
    fn test_bind_without_request_is_noop() {
        let mut op = ApiOperation::new();
        op.bind_context();
        assert!(op.context().is_none());
    }

    #[test]
    fn test_bind_snapshots_fields() {
        let mut op = ApiOperation::new().with_request(Request::new(Bytes::new()));
        op.method = Some("GET".to_string());
        op.response_format = Some(ResponseFormat::Json);
        op.bind_context();

        let view = current_operation(op.context().unwrap()).unwrap();
        assert_eq!(view.request_id, op.id);
        assert_eq!(view.method.as_deref(), Some("GET"));
        assert_eq!(view.response_format, Some(ResponseFormat::Json));
        assert!(view.type_name.is_empty());
    }

    #[test]
    fn test_method_str_unset() {
        assert_eq!(ApiOperation::new().method_str(), "");
    }
}
