//! The `{"success": true, ...}` response body shared by every endpoint.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::AppError;

/// A successful JSON response.
///
/// ```ignore
/// Envelope::new().with("data", &messages)?
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Map<String, JsonValue>);

impl Envelope {
    pub fn new() -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), JsonValue::Bool(true));
        Self(body)
    }

    /// A response carrying only a status message.
    pub fn message(message: impl Into<String>) -> Self {
        let mut envelope = Self::new();
        envelope
            .0
            .insert("message".to_string(), JsonValue::String(message.into()));
        envelope
    }

    /// Adds `value` under `key`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, AppError> {
        self.0.insert(key.to_string(), to_json(value)?);
        Ok(self)
    }

    /// Adds every field of `value`, which must serialize to an object.
    pub fn merge(mut self, value: impl Serialize) -> Result<Self, AppError> {
        match to_json(value)? {
            JsonValue::Object(fields) => {
                self.0.extend(fields);
                Ok(self)
            }
            other => Err(AppError::Internal(format!(
                "expected an object payload, got {}",
                other
            ))),
        }
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self.into_value()).into_response()
    }
}

fn to_json(value: impl Serialize) -> Result<JsonValue, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("failed to serialize response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_merge_and_with() {
        let body = Envelope::message("Graph loaded")
            .merge(json!({"nodes": [], "links": []}))
            .unwrap()
            .with("count", 3)
            .unwrap()
            .into_value();
        assert_eq!(
            body,
            json!({"success": true, "message": "Graph loaded", "nodes": [], "links": [], "count": 3})
        );
    }

    #[test]
    fn test_merge_rejects_non_objects() {
        assert!(Envelope::new().merge(vec![1, 2]).is_err());
    }
}
