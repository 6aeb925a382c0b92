//! Params-style coercion of scalar values.
//!
//! Request params arrive as strings; each declared type accepts its native
//! [`Value`] variant as-is and parses strings into it. Failures report the
//! message code of the expected type (`type.integer`, `type.date`, ...).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use nestform_core::Value;

use crate::schema::ValueType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

const TRUE_STRINGS: &[&str] = &["1", "true", "t", "on", "yes", "y"];
const FALSE_STRINGS: &[&str] = &["0", "false", "f", "off", "no", "n"];

/// The message code for a type mismatch.
pub fn type_code(ty: ValueType) -> String {
    format!("type.{ty}")
}

/// Coerces a non-null scalar to the given type.
///
/// Returns the message code on failure. [`ValueType::Any`] accepts
/// everything; container types are handled by the contract itself.
///
/// # Examples
///
/// ```
/// use nestform_core::Value;
/// use nestform_forms::coerce::coerce_scalar;
/// use nestform_forms::schema::ValueType;
///
/// assert_eq!(coerce_scalar(ValueType::Integer, &Value::from("20")), Ok(Value::Int(20)));
/// assert_eq!(coerce_scalar(ValueType::Bool, &Value::from("on")), Ok(Value::Bool(true)));
/// assert_eq!(
///     coerce_scalar(ValueType::Integer, &Value::from("twenty")),
///     Err("type.integer".to_string())
/// );
/// ```
pub fn coerce_scalar(ty: ValueType, value: &Value) -> Result<Value, String> {
    let coerced = match ty {
        ValueType::Any => Some(value.clone()),
        ValueType::String => match value {
            Value::String(_) => Some(value.clone()),
            _ => None,
        },
        ValueType::Integer => to_integer(value),
        ValueType::Float => to_float(value),
        ValueType::Bool => to_bool(value),
        ValueType::Date => to_date(value),
        ValueType::DateTime => to_date_time(value),
        ValueType::Time => to_time(value),
        ValueType::Hash => matches!(value, Value::Map(_)).then(|| value.clone()),
        ValueType::Array => matches!(value, Value::List(_)).then(|| value.clone()),
    };
    coerced.ok_or_else(|| type_code(ty))
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value.clone()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(_) => Some(value.clone()),
        Value::Int(_) => value.as_f64().map(Value::Float),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Int(1) => Some(Value::Bool(true)),
        Value::Int(0) => Some(Value::Bool(false)),
        Value::String(s) => {
            let lower = s.trim().to_ascii_lowercase();
            if TRUE_STRINGS.contains(&lower.as_str()) {
                Some(Value::Bool(true))
            } else if FALSE_STRINGS.contains(&lower.as_str()) {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .ok()
            .map(Value::Date),
        _ => None,
    }
}

fn to_date_time(value: &Value) -> Option<Value> {
    match value {
        Value::DateTime(_) => Some(value.clone()),
        Value::String(s) => DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
            .map(Value::DateTime),
        _ => None,
    }
}

fn to_time(value: &Value) -> Option<Value> {
    match value {
        Value::Time(_) => Some(value.clone()),
        Value::String(s) => TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
            .map(Value::Time),
        _ => None,
    }
}
