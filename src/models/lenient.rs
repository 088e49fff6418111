//! Deserializers for upstream payloads that mix numbers, numeric strings and
//! nulls. Malformed values collapse to zero or empty instead of failing the
//! whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(as_f64).unwrap_or(0.0))
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

pub fn as_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

/// Reads `value[window]` when the field is a `{"1d": .., "all": ..}` object,
/// or the value itself when upstream sent a scalar.
pub fn windowed(value: &Value, window: &str) -> f64 {
    match value {
        Value::Object(map) => map.get(window).map(as_f64).unwrap_or(0.0),
        other => as_f64(other),
    }
}
