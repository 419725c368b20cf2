//! URL-parsing strategies.
//!
//! A [`UrlParser`] turns a request into a [`ParseAttempt`]: a [`ParsedUrl`]
//! that is always present, however partial, plus an optional error. The
//! normalizer merges the partial result first and only then surfaces the
//! error, so a failed lookup still leaves the operation as complete as the
//! parser could make it.

use apiop_core::{ApiError, ApiOperation, QueryValues, SchemaRegistry};
use bytes::Bytes;
use http::{HeaderMap, Request};
use std::borrow::Cow;
use std::collections::HashMap;

use crate::builder::normalize_prefix;

/// Query parameter naming an action.
pub const ACTION_PARAM: &str = "action";

/// Action value that turns the request into a `DELETE`.
pub const REMOVE_ACTION: &str = "remove";

/// Result of parsing a request URL. Empty strings mean "not found in the URL".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Resource type.
    pub type_name: String,
    /// Resource instance name.
    pub name: String,
    /// Link relation.
    pub link: String,
    /// Method implied by the URL.
    pub method: String,
    /// Action identifier.
    pub action: String,
    /// Path prefix the URL was matched under.
    pub prefix: String,
    /// Additional path context.
    pub sub_context: HashMap<String, String>,
    /// Parsed query parameters.
    pub query: Option<QueryValues>,
}

/// A parse result whose error is held back until the result is merged.
///
/// Use [`populate`](Self::populate) to copy the result into an operation,
/// then [`commit`](Self::commit) to surface the error.
///
/// # Example
///
/// ```rust
/// use apiop_core::{ApiError, ApiOperation};
/// use apiop_parse::{ParseAttempt, ParsedUrl};
///
/// let parsed = ParsedUrl {
///     type_name: "widgets".to_string(),
///     ..Default::default()
/// };
/// let attempt = ParseAttempt::failed(parsed, ApiError::unknown_type("widgets"));
///
/// let mut op = ApiOperation::new();
/// attempt.populate(&mut op);
/// assert_eq!(op.type_name, "widgets");
/// assert!(attempt.commit().is_err());
/// ```
#[derive(Debug, Default)]
pub struct ParseAttempt {
    /// The (possibly partial) result.
    pub parsed: ParsedUrl,
    /// The deferred error.
    pub error: Option<ApiError>,
}

impl ParseAttempt {
    /// A successful parse.
    #[must_use]
    pub fn ok(parsed: ParsedUrl) -> Self {
        Self {
            parsed,
            error: None,
        }
    }

    /// A failed parse that still produced a partial result.
    #[must_use]
    pub fn failed(parsed: ParsedUrl, error: ApiError) -> Self {
        Self {
            parsed,
            error: Some(error),
        }
    }

    /// Returns the deferred error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Copies every field the operation has not set yet.
    ///
    /// `method` is only taken when the result carries a non-empty one, and
    /// `sub_context` entries are added only for keys not already present.
    pub fn populate(&self, op: &mut ApiOperation) {
        let parsed = &self.parsed;

        fill(&mut op.type_name, &parsed.type_name);
        fill(&mut op.name, &parsed.name);
        fill(&mut op.link, &parsed.link);
        fill(&mut op.action, &parsed.action);
        fill(&mut op.url_prefix, &parsed.prefix);

        if op.query.is_none() {
            op.query.clone_from(&parsed.query);
        }
        if op.method.is_none() && !parsed.method.is_empty() {
            op.method = Some(parsed.method.clone());
        }
        for (key, value) in &parsed.sub_context {
            op.sub_context
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Surfaces the deferred error.
    pub fn commit(self) -> Result<(), ApiError> {
        self.error.map_or(Ok(()), Err)
    }
}

impl From<ParsedUrl> for ParseAttempt {
    fn from(parsed: ParsedUrl) -> Self {
        Self::ok(parsed)
    }
}

fn fill(target: &mut String, value: &str) {
    if target.is_empty() {
        value.clone_into(target);
    }
}

/// Pluggable URL-parsing strategy.
///
/// Implementations must be total: every request yields a [`ParseAttempt`],
/// errors included. `response` is the header map of the eventual response,
/// for parsers that need to set headers (redirect hints, `Allow`, ...).
pub trait UrlParser: Send + Sync {
    /// Parses `request`.
    fn parse(
        &self,
        response: &mut HeaderMap,
        request: &Request<Bytes>,
        schemas: Option<&dyn SchemaRegistry>,
    ) -> ParseAttempt;
}

impl<F> UrlParser for F
where
    F: Fn(&mut HeaderMap, &Request<Bytes>, Option<&dyn SchemaRegistry>) -> ParseAttempt
        + Send
        + Sync,
{
    fn parse(
        &self,
        response: &mut HeaderMap,
        request: &Request<Bytes>,
        schemas: Option<&dyn SchemaRegistry>,
    ) -> ParseAttempt {
        self(response, request, schemas)
    }
}

/// Wraps a closure as a [`UrlParser`], fixing its signature for inference.
///
/// # Example
///
/// ```rust
/// use apiop_parse::{url_parser_fn, ParseAttempt, ParsedUrl};
///
/// let parser = url_parser_fn(|_response, _request, _schemas| {
///     ParseAttempt::ok(ParsedUrl {
///         type_name: "node".to_string(),
///         ..Default::default()
///     })
/// });
/// # let _ = parser;
/// ```
pub fn url_parser_fn<F>(f: F) -> F
where
    F: Fn(&mut HeaderMap, &Request<Bytes>, Option<&dyn SchemaRegistry>) -> ParseAttempt
        + Send
        + Sync,
{
    f
}

/// Path-based URL parser: `{prefix}/{type}/{name}/{link}?action={action}`.
///
/// - Repeated slashes collapse to one.
/// - Segments are percent-decoded after splitting, so `%2F` stays inside its
///   segment. A segment that does not decode to UTF-8 is `InvalidRequest`.
/// - A path outside the prefix is `NotFound`.
/// - More than three segments under the prefix is `NotFound`.
/// - `action=remove` becomes method `DELETE` with no action.
/// - With a registry, the type segment is canonicalized to the schema id;
///   an unknown type is `NotFound`.
///
/// The query is parsed before anything can fail, so every attempt carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultUrlParser {
    prefix: String,
}

impl DefaultUrlParser {
    /// Creates a parser matching paths under `prefix`.
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

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

impl Default for DefaultUrlParser {
    fn default() -> Self {
        Self::new("")
    }
}

impl UrlParser for DefaultUrlParser {
    fn parse(
        &self,
        _response: &mut HeaderMap,
        request: &Request<Bytes>,
        schemas: Option<&dyn SchemaRegistry>,
    ) -> ParseAttempt {
        let query = QueryValues::from_uri(request.uri());
        let mut parsed = ParsedUrl {
            prefix: self.prefix.clone(),
            ..Default::default()
        };

        match query.get(ACTION_PARAM) {
            Some(REMOVE_ACTION) => parsed.method = http::Method::DELETE.to_string(),
            Some(action) => parsed.action = action.to_string(),
            None => {}
        }
        parsed.query = Some(query);

        let path = collapse_slashes(request.uri().path());
        let Some(rest) = self.strip_prefix(&path) else {
            return ParseAttempt::failed(
                parsed,
                ApiError::not_found(format!("path {path} is outside {}", self.prefix)),
            );
        };

        // Split before decoding so an encoded '/' stays inside its segment.
        let raw: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let decoded: Result<Vec<String>, _> = raw
            .iter()
            .map(|segment| urlencoding::decode(segment).map(Cow::into_owned))
            .collect();
        let segments = match decoded {
            Ok(segments) => segments,
            Err(e) => {
                fill_segments(&mut parsed, raw.iter().map(|s| (*s).to_string()));
                return ParseAttempt::failed(
                    parsed,
                    ApiError::invalid_request(format!("path {path} is not valid UTF-8: {e}")),
                );
            }
        };
        let count = segments.len();
        fill_segments(&mut parsed, segments.into_iter());

        if count > 3 {
            return ParseAttempt::failed(parsed, ApiError::not_found(format!("path {path} not found")));
        }

        if let Some(schemas) = schemas {
            if !parsed.type_name.is_empty() {
                match schemas.schema(&parsed.type_name) {
                    Some(schema) => parsed.type_name = schema.id().to_string(),
                    None => {
                        let error = ApiError::unknown_type(parsed.type_name.clone());
                        return ParseAttempt::failed(parsed, error);
                    }
                }
            }
        }

        ParseAttempt::ok(parsed)
    }
}

fn fill_segments(parsed: &mut ParsedUrl, mut segments: impl Iterator<Item = String>) {
    parsed.type_name = segments.next().unwrap_or_default();
    parsed.name = segments.next().unwrap_or_default();
    parsed.link = segments.next().unwrap_or_default();
}

fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiop_core::{fixtures, ErrorCategory};

    fn parse(parser: &DefaultUrlParser, uri: &str, schemas: Option<&dyn SchemaRegistry>) -> ParseAttempt {
        let request = Request::get(uri).body(Bytes::new()).unwrap();
        parser.parse(&mut HeaderMap::new(), &request, schemas)
    }

    #[test]
    fn test_collapse_slashes() {
        assert_eq!(collapse_slashes("//v1///clusters/"), "/v1/clusters/");
        assert_eq!(collapse_slashes("/"), "/");
    }

    #[test]
    fn test_type_name_link() {
        let attempt = parse(&DefaultUrlParser::new("/v1"), "/v1/clusters/c1/nodes", None);
        assert!(attempt.error().is_none());
        assert_eq!(attempt.parsed.type_name, "clusters");
        assert_eq!(attempt.parsed.name, "c1");
        assert_eq!(attempt.parsed.link, "nodes");
        assert_eq!(attempt.parsed.prefix, "/v1");
    }

    #[test]
    fn test_segments_percent_decoded() {
        let schemas = fixtures::cluster_schemas();
        let attempt = parse(
            &DefaultUrlParser::default(),
            "/clu%73ters/my%20cluster/a%2Fb",
            Some(&schemas),
        );
        assert!(attempt.error().is_none());
        assert_eq!(attempt.parsed.type_name, "cluster");
        assert_eq!(attempt.parsed.name, "my cluster");
        assert_eq!(attempt.parsed.link, "a/b");
    }

    #[test]
    fn test_invalid_utf8_segment() {
        let attempt = parse(&DefaultUrlParser::default(), "/clusters/%FF", None);
        assert_eq!(attempt.error().unwrap().category(), ErrorCategory::InvalidRequest);
        assert_eq!(attempt.parsed.type_name, "clusters");
        assert_eq!(attempt.parsed.name, "%FF");
    }

    #[test]
    fn test_prefix_boundary() {
        let attempt = parse(&DefaultUrlParser::new("/v1"), "/v10/clusters?x=1", None);
        let error = attempt.error().unwrap();
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(attempt.parsed.query.as_ref().unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_too_many_segments() {
        let attempt = parse(&DefaultUrlParser::default(), "/a/b/c/d", None);
        assert_eq!(attempt.error().unwrap().category(), ErrorCategory::NotFound);
        assert_eq!(attempt.parsed.type_name, "a");
    }

    #[test]
    fn test_action_param() {
        let attempt = parse(&DefaultUrlParser::default(), "/clusters/c1?action=restart", None);
        assert_eq!(attempt.parsed.action, "restart");
        assert!(attempt.parsed.method.is_empty());
    }

    #[test]
    fn test_remove_action_is_delete() {
        let attempt = parse(&DefaultUrlParser::default(), "/clusters/c1?action=remove", None);
        assert!(attempt.parsed.action.is_empty());
        assert_eq!(attempt.parsed.method, "DELETE");
    }

    #[test]
    fn test_canonicalizes_type() {
        let schemas = fixtures::cluster_schemas();
        let attempt = parse(&DefaultUrlParser::default(), "/policies/p1", Some(&schemas));
        assert!(attempt.error().is_none());
        assert_eq!(attempt.parsed.type_name, "policy");
    }

    #[test]
    fn test_unknown_type() {
        let schemas = fixtures::cluster_schemas();
        let attempt = parse(&DefaultUrlParser::default(), "/widgets/w1", Some(&schemas));
        assert_eq!(attempt.parsed.type_name, "widgets");
        assert_eq!(attempt.parsed.name, "w1");
        assert_eq!(attempt.error().unwrap().category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_root_path() {
        let attempt = parse(&DefaultUrlParser::new("/v1/"), "/v1", None);
        assert!(attempt.error().is_none());
        assert!(attempt.parsed.type_name.is_empty());
    }

    #[test]
    fn test_populate_keeps_existing_fields() {
        let attempt = ParseAttempt::ok(ParsedUrl {
            type_name: "cluster".to_string(),
            name: "c1".to_string(),
            method: "DELETE".to_string(),
            sub_context: HashMap::from([
                ("zone".to_string(), "a".to_string()),
                ("rack".to_string(), "7".to_string()),
            ]),
            ..Default::default()
        });

        let mut op = ApiOperation::new();
        op.name = "preset".to_string();
        op.method = Some("GET".to_string());
        op.sub_context.insert("zone".to_string(), "b".to_string());
        attempt.populate(&mut op);

        assert_eq!(op.type_name, "cluster");
        assert_eq!(op.name, "preset");
        assert_eq!(op.method.as_deref(), Some("GET"));
        assert_eq!(op.sub_context["zone"], "b");
        assert_eq!(op.sub_context["rack"], "7");
    }

    #[test]
    fn test_populate_empty_method_ignored() {
        let mut op = ApiOperation::new();
        ParseAttempt::ok(ParsedUrl::default()).populate(&mut op);
        assert!(op.method.is_none());
    }

    #[test]
    fn test_closure_parser() {
        let parser = url_parser_fn(|response, _request, _schemas| {
            response.insert("x-parsed", http::HeaderValue::from_static("yes"));
            ParsedUrl::default().into()
        });
        let request = Request::get("/").body(Bytes::new()).unwrap();
        let mut headers = HeaderMap::new();

        let attempt = parser.parse(&mut headers, &request, None);
        assert!(attempt.commit().is_ok());
        assert_eq!(headers["x-parsed"], "yes");
    }
}
