//! Uniform representation of a submitted payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ops::Deref;

/// Key/value object produced by body extraction.
///
/// Form and multipart payloads map each field name to an array of strings.
/// Raw JSON or YAML bodies keep whatever structure the client sent.
///
/// # Example
///
/// ```
/// use apiop_core::ApiObject;
/// use std::collections::HashMap;
///
/// let mut fields = HashMap::new();
/// fields.insert("a".to_string(), vec!["1".to_string(), "2".to_string()]);
///
/// let object = ApiObject::from_values(fields);
/// assert_eq!(object.values("a"), Some(vec!["1", "2"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiObject(Map<String, Value>);

impl ApiObject {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts multi-valued form fields into an object of string arrays.
    #[must_use]
    pub fn from_values(values: HashMap<String, Vec<String>>) -> Self {
        Self(
            values
                .into_iter()
                .map(|(key, values)| {
                    let array = values.into_iter().map(Value::String).collect();
                    (key, Value::Array(array))
                })
                .collect(),
        )
    }

    /// Returns the string values stored under `key`, if it holds an array of strings.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<Vec<&str>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Consumes the object and returns the inner JSON map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Converts the object into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl Deref for ApiObject {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for ApiObject {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_values() {
        let mut fields = HashMap::new();
        fields.insert("a".to_string(), vec!["1".to_string(), "2".to_string()]);

        let object = ApiObject::from_values(fields);
        assert_eq!(object.into_value(), json!({"a": ["1", "2"]}));
    }

    #[test]
    fn test_values_on_non_array() {
        let object: ApiObject = serde_json::from_value(json!({"name": "alice"})).unwrap();
        assert_eq!(object.values("name"), None);
        assert_eq!(object.get("name"), Some(&json!("alice")));
    }

    #[test]
    fn test_empty() {
        assert!(ApiObject::new().is_empty());
    }
}
