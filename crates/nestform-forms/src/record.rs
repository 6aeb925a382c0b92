//! The backing record collaborator.
//!
//! A form reads defaults from its record when an attribute was never
//! assigned, and nested nodes are bound to the record's associations of the
//! same name. Every lookup is nil-safe: a record that lacks a field or an
//! association answers `None`, never an error.

use std::fmt;
use std::sync::Arc;

use nestform_core::{Value, ValueMap};

/// A shared handle to a record.
pub type RecordRef = Arc<dyn Record>;

/// The result of looking up an association on a record.
#[derive(Clone, Default)]
pub enum Association {
    /// The record has no such association.
    #[default]
    None,
    /// A has-one association.
    One(RecordRef),
    /// A has-many association, in the record's order.
    Many(Vec<RecordRef>),
}

impl Association {
    /// Returns the single associated record, if any.
    pub fn one(&self) -> Option<RecordRef> {
        match self {
            Self::One(record) => Some(Arc::clone(record)),
            _ => None,
        }
    }

    /// Returns the associated records; empty unless this is a has-many.
    pub fn many(&self) -> &[RecordRef] {
        match self {
            Self::Many(records) => records,
            _ => &[],
        }
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::One(_) => f.write_str("One(..)"),
            Self::Many(records) => write!(f, "Many({})", records.len()),
        }
    }
}

/// A domain object a form reads defaults from.
///
/// Only [`get`](Record::get) is required; the remaining methods default to
/// an unsaved record with no associations.
pub trait Record: Send + Sync + fmt::Debug {
    /// Returns the value of a field, or `None` when the record lacks it.
    fn get(&self, field: &str) -> Option<Value>;

    /// Returns the association with the given name.
    fn association(&self, _name: &str) -> Association {
        Association::None
    }

    /// Whether the record has been saved.
    fn is_persisted(&self) -> bool {
        false
    }

    /// The record identifier.
    fn id(&self) -> Option<Value> {
        None
    }
}

/// A plain map acting as a record.
///
/// Nested maps are exposed as has-one associations and lists of maps as
/// has-many associations. A `HashRecord` is never persisted; its id is the
/// `"id"` entry.
///
/// # Examples
///
/// ```
/// use nestform_core::{Value, ValueMap};
/// use nestform_forms::record::{HashRecord, Record};
///
/// let mut map = ValueMap::new();
/// map.insert("id".into(), Value::Int(7));
/// map.insert("name".into(), Value::from("Ivan"));
/// let record = HashRecord::new(map);
///
/// assert_eq!(record.get("name"), Some(Value::from("Ivan")));
/// assert_eq!(record.id(), Some(Value::Int(7)));
/// assert!(!record.is_persisted());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashRecord {
    values: ValueMap,
}

impl HashRecord {
    /// Wraps a map.
    pub const fn new(values: ValueMap) -> Self {
        Self { values }
    }

    /// Wraps a map into a shared record handle.
    pub fn shared(values: ValueMap) -> RecordRef {
        Arc::new(Self::new(values))
    }

    /// Returns the underlying map.
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }
}

impl From<ValueMap> for HashRecord {
    fn from(values: ValueMap) -> Self {
        Self::new(values)
    }
}

impl Record for HashRecord {
    fn get(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn association(&self, name: &str) -> Association {
        match self.values.get(name) {
            Some(Value::Map(map)) => Association::One(Self::shared(map.clone())),
            Some(Value::List(items)) => Association::Many(
                items
                    .iter()
                    .filter_map(|item| item.as_map().map(|map| Self::shared(map.clone())))
                    .collect(),
            ),
            _ => Association::None,
        }
    }

    fn id(&self) -> Option<Value> {
        self.values.get("id").filter(|v| !v.is_null()).cloned()
    }
}
