//! Multi-valued query parameters.

use std::collections::HashMap;

/// Parsed query parameters, keyed by name, preserving every value.
///
/// # Example
///
/// ```
/// use apiop_core::QueryValues;
///
/// let query = QueryValues::parse("tag=a&tag=b&limit=10");
/// assert_eq!(query.get("tag"), Some("a"));
/// assert_eq!(query.get_all("tag"), &["a", "b"]);
/// assert_eq!(query.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    values: HashMap<String, Vec<String>>,
}

impl QueryValues {
    /// Creates an empty set of query values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (without the leading `?`).
    ///
    /// Malformed pairs are skipped rather than failing the whole string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::new();
        for (key, value) in form_pairs(raw) {
            query.append(key, value);
        }
        query
    }

    /// Parses the query component of a URI. A URI without one yields an empty set.
    #[must_use]
    pub fn from_uri(uri: &http::Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for `key`, in order of appearance.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// Appends a value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Returns `true` if no parameters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over `(key, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Consumes the query and returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> HashMap<String, Vec<String>> {
        self.values
    }
}

impl From<HashMap<String, Vec<String>>> for QueryValues {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self { values }
    }
}

/// Decodes `application/x-www-form-urlencoded` pairs, keeping repeated keys.
///
/// Each pair is decoded on its own so one bad escape does not discard the rest.
pub(crate) fn form_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            serde_urlencoded::from_str::<Vec<(String, String)>>(pair)
                .ok()
                .and_then(|mut decoded| decoded.pop())
        })
        .collect()
}
