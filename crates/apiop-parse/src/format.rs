//! Response format negotiation.

use apiop_core::{QueryValues, ResponseFormat};
use http::{header, Request};

/// Query parameter forcing the response format.
pub const FORMAT_PARAM: &str = "_format";

/// Picks the response format for `request`.
///
/// Precedence, first match wins:
///
/// 1. `_format` query value, trimmed and lowercased, naming a known format.
/// 2. An interactive browser ([`is_browser`] with wildcard accept) gets `html`.
/// 3. An `Accept` header mentioning `application/yaml` gets `yaml`.
/// 4. `json`.
///
/// # Example
///
/// ```rust
/// use apiop_core::ResponseFormat;
/// use apiop_parse::resolve_format;
/// use http::Request;
///
/// let request = Request::get("/nodes?_format=%20YAML%20").body(()).unwrap();
/// assert_eq!(resolve_format(&request), ResponseFormat::Yaml);
///
/// let request = Request::get("/nodes").body(()).unwrap();
/// assert_eq!(resolve_format(&request), ResponseFormat::Json);
/// ```
#[must_use]
pub fn resolve_format<B>(request: &Request<B>) -> ResponseFormat {
    resolve_format_with(request, FORMAT_PARAM)
}

/// Like [`resolve_format`], reading the override from `param`.
#[must_use]
pub fn resolve_format_with<B>(request: &Request<B>, param: &str) -> ResponseFormat {
    let query = QueryValues::from_uri(request.uri());
    if let Some(format) = query
        .get(param)
        .and_then(|value| ResponseFormat::from_name(&value.trim().to_lowercase()))
    {
        return format;
    }

    if is_browser(request, true) {
        return ResponseFormat::Html;
    }

    if header_str(request, header::ACCEPT).contains("application/yaml") {
        return ResponseFormat::Yaml;
    }

    ResponseFormat::Json
}

/// Returns `true` if `request` looks like it comes from an interactive browser.
///
/// The user agent must mention `mozilla` and the accept header must allow
/// `*/*`. An empty accept header, or `accept_wildcard == false`, counts as
/// `*/*`. Both headers are compared case-insensitively.
///
/// # Example
///
/// ```rust
/// use apiop_parse::is_browser;
/// use http::Request;
///
/// let request = Request::get("/")
///     .header("user-agent", "Mozilla/5.0")
///     .header("accept", "text/html,*/*;q=0.8")
///     .body(())
///     .unwrap();
/// assert!(is_browser(&request, true));
///
/// let request = Request::get("/").header("user-agent", "curl/8.0").body(()).unwrap();
/// assert!(!is_browser(&request, true));
/// ```
#[must_use]
pub fn is_browser<B>(request: &Request<B>, accept_wildcard: bool) -> bool {
    let mut accept = header_str(request, header::ACCEPT).to_lowercase();
    let user_agent = header_str(request, header::USER_AGENT).to_lowercase();

    if accept.is_empty() || !accept_wildcard {
        accept = "*/*".to_string();
    }

    user_agent.contains("mozilla") && accept.contains("*/*")
}

fn header_str<B>(request: &Request<B>, name: header::HeaderName) -> &str {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0";

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::get(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_query_override() {
        for (raw, expected) in [
            ("html", ResponseFormat::Html),
            ("json", ResponseFormat::Json),
            ("YAML", ResponseFormat::Yaml),
            ("%20Json%20", ResponseFormat::Json),
        ] {
            let req = request(&format!("/nodes?_format={raw}"), &[]);
            assert_eq!(resolve_format(&req), expected, "_format={raw}");
        }
    }

    #[test]
    fn test_query_override_beats_browser() {
        let req = request("/nodes?_format=json", &[("user-agent", FIREFOX)]);
        assert_eq!(resolve_format(&req), ResponseFormat::Json);
    }

    #[test]
    fn test_unknown_override_falls_through() {
        let req = request(
            "/nodes?_format=xml",
            &[("accept", "application/yaml")],
        );
        assert_eq!(resolve_format(&req), ResponseFormat::Yaml);

        let req = request("/nodes?_format=xml", &[]);
        assert_eq!(resolve_format(&req), ResponseFormat::Json);
    }

    #[test]
    fn test_browser_gets_html() {
        let req = request(
            "/nodes",
            &[("user-agent", FIREFOX), ("accept", "text/html,*/*;q=0.8")],
        );
        assert_eq!(resolve_format(&req), ResponseFormat::Html);
    }

    #[test]
    fn test_browser_without_wildcard_accept() {
        let req = request(
            "/nodes",
            &[("user-agent", FIREFOX), ("accept", "application/json")],
        );
        assert!(!is_browser(&req, true));
        assert!(is_browser(&req, false));
        assert_eq!(resolve_format(&req), ResponseFormat::Json);
    }

    #[test]
    fn test_browser_empty_accept() {
        let req = request("/nodes", &[("user-agent", FIREFOX)]);
        assert!(is_browser(&req, true));
    }

    #[test]
    fn test_accept_yaml() {
        let req = request("/nodes", &[("accept", "application/yaml")]);
        assert_eq!(resolve_format(&req), ResponseFormat::Yaml);
    }

    #[test]
    fn test_browser_beats_accept_yaml() {
        let req = request(
            "/nodes",
            &[("user-agent", "Mozilla/5.0"), ("accept", "application/yaml, */*")],
        );
        assert_eq!(resolve_format(&req), ResponseFormat::Html);
    }

    #[test]
    fn test_browser_accepting_only_yaml_gets_yaml() {
        let req = request(
            "/nodes",
            &[("user-agent", "Mozilla/5.0"), ("accept", "application/yaml")],
        );
        assert!(!is_browser(&req, true));
        assert_eq!(resolve_format(&req), ResponseFormat::Yaml);
    }

    #[test]
    fn test_default_json() {
        let req = request("/nodes", &[("accept", "application/json")]);
        assert_eq!(resolve_format(&req), ResponseFormat::Json);
    }
}
