//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries.
///
/// A map of parameter names to JSON values that can be passed to queries.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
///
/// Rows are fetched on-demand, not loaded all at once.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or if deserialization fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Internal(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Gets a value from the row, returning `None` if the key doesn't exist
    /// or holds null.
    ///
    /// Still returns an error if the key exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Reads a string column, rendering numbers and booleans as text.
    ///
    /// Dataset ids and timestamps are not always strings in the source
    /// files, so lookups tolerate either representation.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Null => None,
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Deserializes the whole row into a struct keyed by column name.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let object: serde_json::Map<String, JsonValue> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(JsonValue::Object(object))
            .map_err(|e| AppError::Internal(format!("failed to deserialize row: {}", e)))
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

impl From<JsonValue> for Row {
    /// Builds a row from a JSON object; any other value yields an empty row.
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::new(map.into_iter().collect()),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_get_string() {
        let row = Row::from(json!({"name": "Nadia Conti"}));
        let name: String = row.get("name").unwrap();
        assert_eq!(name, "Nadia Conti");
    }

    #[test]
    fn test_row_get_number() {
        let row = Row::from(json!({"count": 42}));
        let count: i64 = row.get("count").unwrap();
        assert_eq!(count, 42);
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::new(HashMap::new());
        let result: Result<String, _> = row.get("missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_get_opt_null() {
        let row = Row::from(json!({"content": null}));
        let content: Option<String> = row.get_opt("content").unwrap();
        assert_eq!(content, None);
    }

    #[test]
    fn test_row_get_opt_missing() {
        let row = Row::default();
        let name: Option<String> = row.get_opt("missing").unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn test_row_get_text_accepts_numbers() {
        let row = Row::from(json!({"id": 17, "name": "Haacklee", "flag": true, "none": null}));
        assert_eq!(row.get_text("id").as_deref(), Some("17"));
        assert_eq!(row.get_text("name").as_deref(), Some("Haacklee"));
        assert_eq!(row.get_text("flag").as_deref(), Some("true"));
        assert_eq!(row.get_text("none"), None);
        assert_eq!(row.get_text("missing"), None);
    }

    #[test]
    fn test_row_parse_struct() {
        #[derive(serde::Deserialize)]
        struct Pair {
            source: String,
            count: Option<u64>,
        }

        let row = Row::from(json!({"source": "Mako", "count": null, "extra": 1}));
        let pair: Pair = row.parse().unwrap();
        assert_eq!(pair.source, "Mako");
        assert_eq!(pair.count, None);
    }

    #[test]
    fn test_row_from_non_object_is_empty() {
        assert!(Row::from(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_row_columns() {
        let row = Row::from(json!({"a": 1, "b": 2}));
        let mut columns: Vec<_> = row.columns().collect();
        columns.sort();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(row.len(), 2);
    }
}
