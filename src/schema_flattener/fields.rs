// Lenient scalar extraction for loosely typed metadata fields
use serde_json::{Map, Value};
use tracing::debug;

/// Look up `key`, treating JSON null the same as an absent key
pub fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Text of a scalar value; non-string scalars use their JSON rendering
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer value from a JSON number or numeric string
pub fn integer(field: &str, value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    if parsed.is_none() {
        debug!(field = field, value = %value, "Ignoring non-integer value");
    }
    parsed
}

/// Boolean value from a JSON bool or a Y/N style flag
pub fn flag(field: &str, value: &Value) -> Option<bool> {
    let parsed = match value {
        Value::Null => return None,
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" => Some(true),
            "N" | "NO" | "FALSE" => Some(false),
            _ => None,
        },
        _ => None,
    };

    if parsed.is_none() {
        debug!(field = field, value = %value, "Ignoring non-boolean value");
    }
    parsed
}
