//! Incoming request params and the blank-to-absent transform.

use nestform_core::{Value, ValueMap};
use nestform_http::QueryDict;

/// Params handed to [`FormNode::set_params`](crate::FormNode::set_params).
#[derive(Debug, Clone)]
pub enum Params {
    /// An already nested map, e.g. a decoded JSON body.
    Map(ValueMap),
    /// A raw query dictionary. Only accepted when the settings allow it.
    Query(QueryDict),
}

impl From<ValueMap> for Params {
    fn from(map: ValueMap) -> Self {
        Self::Map(map)
    }
}

impl From<QueryDict> for Params {
    fn from(query: QueryDict) -> Self {
        Self::Query(query)
    }
}

impl From<serde_json::Value> for Params {
    fn from(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Map(map) => Self::Map(map),
            _ => Self::Map(ValueMap::new()),
        }
    }
}

/// Applies the blank-to-absent transform.
///
/// Strings are trimmed and become [`Value::Null`] when nothing is left.
/// Lists are transformed element-wise and absent elements are dropped,
/// keeping the order of the rest. Maps are transformed value-wise; their
/// keys are kept even when a value becomes absent.
///
/// # Examples
///
/// ```
/// use nestform_core::Value;
/// use nestform_forms::params::deep_transform;
///
/// assert_eq!(deep_transform(Value::from("  hi ")), Value::from("hi"));
/// assert_eq!(deep_transform(Value::from("   ")), Value::Null);
/// assert_eq!(
///     deep_transform(Value::List(vec![" a".into(), "".into(), Value::Null, "b".into()])),
///     Value::List(vec!["a".into(), "b".into()])
/// );
/// ```
pub fn deep_transform(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(deep_transform)
                .filter(|v| !v.is_null())
                .collect(),
        ),
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, deep_transform(v)))
                .collect(),
        ),
        other => other,
    }
}
