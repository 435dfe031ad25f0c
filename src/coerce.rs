//! Defensive conversion of loosely-typed API JSON

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert any JSON value to a finite number, falling back to `0.0`
///
/// Numbers pass through, strings are trimmed and parsed (empty gives zero),
/// booleans map to one/zero. Everything else, and any non-finite result, is zero.
pub fn safe_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Render a scalar as text; blank strings, null and containers give `None`
pub fn safe_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Borrow an array field, treating a missing or wrong-typed field as empty
pub fn safe_array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Format a coerced number with a fixed number of decimals
pub fn format_number(value: &Value, decimals: usize) -> String {
    format!("{:.*}", decimals, safe_number(value))
}

/// serde adapter: numeric field that never fails to deserialize
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(safe_number(&value))
}

/// serde adapter: integer field that never fails to deserialize
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(safe_number(&value) as i64)
}

/// serde adapter: text field accepting any scalar, empty when absent
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(safe_text(&value).unwrap_or_default())
}

/// serde adapter: optional text field accepting any scalar
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(safe_text(&value))
}
