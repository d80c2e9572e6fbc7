//! Request-payload validation helpers.
//!
//! Clients send numeric fields as either JSON numbers or numeric strings
//! (`"qty": 5` and `"qty": "5"` are both accepted), so the recording
//! endpoints take those fields as raw [`serde_json::Value`]s and coerce them
//! here. Anything that is not a number, a numeric string, or (for optional
//! fields) absent is a [`CoreError::TypeConversion`].

use crate::error::{CoreError, CoreResult, ValidationError};
use serde_json::Value;

/// Coerces a required numeric field from a JSON value.
pub fn numeric_field(field: &'static str, value: &Value) -> CoreResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or(CoreError::TypeConversion { field }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoreError::TypeConversion { field }),
        _ => Err(CoreError::TypeConversion { field }),
    }
}

/// Coerces an optional numeric field, treating absent and `null` as the
/// default.
pub fn numeric_field_or(field: &'static str, value: Option<&Value>, default: f64) -> CoreResult<f64> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(v) => numeric_field(field, v),
    }
}

/// Requires a non-empty string field.
pub fn required_str<'a>(field: &'static str, value: Option<&'a str>) -> CoreResult<&'a str> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ValidationError::Required { field }.into()),
    }
}

/// Requires a non-empty collection.
pub fn non_empty<T>(field: &'static str, items: &[T]) -> CoreResult<()> {
    if items.is_empty() {
        Err(ValidationError::EmptyCollection { field }.into())
    } else {
        Ok(())
    }
}
