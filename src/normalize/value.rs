use serde_json::{Map, Value};

use super::DecodeError;

pub type Object = Map<String, Value>;

pub fn as_object<'a>(value: &'a Value, what: &'static str) -> Result<&'a Object, DecodeError> {
    value.as_object().ok_or(DecodeError::NotAnObject(what))
}

/// Required non-empty string field.
pub fn required_str(obj: &Object, field: &'static str) -> Result<String, DecodeError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected string, got {}", other),
        }),
    }
}

/// Optional string field. Empty strings and non-strings read as absent.
pub fn opt_str(obj: &Object, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Number that may arrive as a JSON number or a numeric string.
pub fn loose_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Optional numeric field. Absent or null is None; anything unparsable is an error.
pub fn opt_f64(obj: &Object, field: &'static str) -> Result<Option<f64>, DecodeError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => loose_f64(v).map(Some).ok_or_else(|| DecodeError::InvalidField {
            field,
            reason: format!("not a number: {}", v),
        }),
    }
}

/// First of `fields` that holds a number.
pub fn first_f64(obj: &Object, fields: &[&'static str]) -> Result<Option<f64>, DecodeError> {
    for field in fields {
        if let Some(v) = opt_f64(obj, field)? {
            return Ok(Some(v));
        }
    }
    Ok(None)
}
