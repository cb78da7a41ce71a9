//! Field access for JSON payloads.

use crate::command::ValidationResult;
use crate::error::CommandError;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn int(payload: &Value, key: &str) -> Option<i32> {
    payload
        .get(key)?
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
}

pub(crate) fn float(payload: &Value, key: &str) -> Option<f32> {
    payload.get(key)?.as_f64().map(|v| v as f32)
}

pub(crate) fn text<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key)?.as_str()
}

/// Missing or non-boolean counts as `false`.
pub(crate) fn flag(payload: &Value, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn int_list(payload: &Value, key: &str) -> Option<Vec<i32>> {
    payload.get(key)?.as_array().map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_i64().and_then(|v| i32::try_from(v).ok()))
            .collect()
    })
}

pub(crate) fn require_int(payload: &Value, key: &str) -> Result<i32, CommandError> {
    int(payload, key).ok_or_else(|| CommandError::Validation(format!("'{key}' must be an integer")))
}

pub(crate) fn require_float(payload: &Value, key: &str) -> Result<f32, CommandError> {
    float(payload, key).ok_or_else(|| CommandError::Validation(format!("'{key}' must be a number")))
}

pub(crate) fn require_text<'a>(payload: &'a Value, key: &str) -> Result<&'a str, CommandError> {
    text(payload, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CommandError::Validation(format!("'{key}' is required")))
}

/// Field errors for each integer and number field that is missing or mistyped.
pub(crate) fn check_fields(payload: &Value, ints: &[&str], numbers: &[&str]) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for key in ints {
        if int(payload, key).is_none() {
            result = result.with_field_error(*key, "must be an integer");
        }
    }
    for key in numbers {
        if float(payload, key).is_none() {
            result = result.with_field_error(*key, "must be a number");
        }
    }
    result
}

/// Decode a value stored in a previous result, for undo.
pub(crate) fn decode<T: DeserializeOwned>(value: Option<&Value>, what: &str) -> Result<T, CommandError> {
    value
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| CommandError::UndoFailed(format!("result has no {what}")))
}
