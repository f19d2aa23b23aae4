//! Coercion for the transport boundary.
//!
//! The tool transport is not guaranteed to deliver primitives untouched: a
//! URL may arrive wrapped as `{"url": "..."}`, a count as `"5"` or
//! `{"max_subpages": 5}`, and a findings batch as a JSON string. All
//! unwrapping happens here, once, so the engine's internal APIs stay
//! strictly typed.

use crate::error::{CoreError, Result};
use crate::findings::{FindingType, NewFinding};
use serde_json::Value;

const STR_WRAPPER_KEYS: [&str; 4] = ["url", "value", "text", "source_id"];
const INT_WRAPPER_KEYS: [&str; 3] = ["max_subpages", "max_subpages_per_source", "value"];

/// Unwrap a value that should be a string. Known wrapper objects resolve to
/// their inner value, any other object to its first value; scalars print.
pub fn coerce_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for key in STR_WRAPPER_KEYS {
                if let Some(inner) = map.get(key) {
                    return coerce_str(inner);
                }
            }
            map.values().next().map(coerce_str).unwrap_or_default()
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Unwrap a value that should be an integer, falling back to `default`
/// rather than failing the whole operation.
pub fn coerce_int(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(default),
        Value::String(s) => s.trim().parse().unwrap_or(default),
        Value::Object(map) => {
            for key in INT_WRAPPER_KEYS {
                if let Some(inner) = map.get(key) {
                    return coerce_int(inner, default);
                }
            }
            map.values()
                .next()
                .map(|v| coerce_int(v, default))
                .unwrap_or(default)
        }
        _ => default,
    }
}

/// A count argument from the transport: a bare number, a numeric string, or
/// a JSON-wrapped value.
pub fn int_arg(raw: &str, default: usize) -> usize {
    if let Ok(n) = raw.trim().parse::<usize>() {
        return n;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => usize::try_from(coerce_int(&value, default as i64)).unwrap_or(default),
        Err(_) => default,
    }
}

/// A URL argument from the transport, possibly JSON-wrapped.
pub fn url_arg(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{')
        && let Ok(value) = serde_json::from_str::<Value>(trimmed)
    {
        return coerce_str(&value);
    }
    trimmed.to_string()
}

/// Parse a findings payload: a JSON array of objects. A bare object becomes
/// a one-element batch; non-object elements are dropped silently before
/// counting; unknown or missing `type` becomes `other`. Anything that is not
/// JSON at all is a validation error.
pub fn coerce_findings(raw: &str) -> Result<Vec<NewFinding>> {
    let value: Value = serde_json::from_str(raw).map_err(|_| {
        CoreError::Validation("findings must be a JSON array of objects".to_string())
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };

    Ok(items.iter().filter_map(finding_from_value).collect())
}

fn finding_from_value(value: &Value) -> Option<NewFinding> {
    let map = value.as_object()?;
    let field = |key: &str| map.get(key).map(coerce_str);
    let optional = |key: &str| field(key).filter(|s| !s.is_empty());

    Some(NewFinding {
        id: optional("id"),
        kind: field("type")
            .and_then(|t| t.parse().ok())
            .unwrap_or(FindingType::Other),
        title: field("title").unwrap_or_default(),
        description: field("description").unwrap_or_default(),
        source_url: field("source_url").unwrap_or_default(),
        due_date: optional("due_date"),
        location: optional("location"),
        time_info: optional("time_info"),
    })
}
