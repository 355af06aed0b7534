//! Result extraction for trading command responses.
//!
//! Order ids arrive as strings or numbers depending on the endpoint, so both
//! are accepted and normalised to `String`.

use crate::error::MappingError;
use serde_json::Value;

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `data.orderId` of a single-order response.
pub fn order_id(body: &Value) -> Result<String, MappingError> {
    body.get("data")
        .and_then(|data| data.get("orderId"))
        .and_then(id_text)
        .ok_or_else(|| MappingError::Payload("missing data.orderId".into()))
}

/// Order ids listed under `data`, either as `{orderId}` objects or bare ids.
///
/// A missing or non-array `data` yields an empty list.
pub fn order_ids(body: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = body.get("data") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => obj.get("orderId").and_then(id_text),
            other => id_text(other),
        })
        .collect()
}
