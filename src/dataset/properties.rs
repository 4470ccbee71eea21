//! Property maps Neo4j will accept.

use serde_json::{Map, Value as JsonValue};

/// Makes a property map storable.
///
/// Neo4j properties must be primitives or homogeneous lists of primitives.
/// Nulls are dropped; objects, nested lists and mixed lists are stored as
/// their JSON text. Integer lists holding a float become float lists.
pub fn sanitize_properties(properties: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    properties
        .iter()
        .filter_map(|(key, value)| sanitize_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn sanitize_value(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => Some(value.clone()),
        JsonValue::Array(items) if is_homogeneous(items) => Some(widen_numbers(items)),
        JsonValue::Array(_) | JsonValue::Object(_) => Some(JsonValue::String(value.to_string())),
    }
}

fn is_homogeneous(items: &[JsonValue]) -> bool {
    let Some(first) = items.first() else {
        return true;
    };
    let same_kind = |a: &JsonValue, b: &JsonValue| {
        matches!(
            (a, b),
            (JsonValue::Bool(_), JsonValue::Bool(_))
                | (JsonValue::Number(_), JsonValue::Number(_))
                | (JsonValue::String(_), JsonValue::String(_))
        )
    };
    items.iter().all(|item| same_kind(first, item))
}

/// Neo4j rejects a list of integers and floats together.
fn widen_numbers(items: &[JsonValue]) -> JsonValue {
    let has_float = items
        .iter()
        .any(|item| matches!(item, JsonValue::Number(n) if n.is_f64()));
    if !has_float {
        return JsonValue::Array(items.to_vec());
    }
    items
        .iter()
        .map(|item| match item.as_f64() {
            Some(f) => JsonValue::from(f),
            None => item.clone(),
        })
        .collect()
}
