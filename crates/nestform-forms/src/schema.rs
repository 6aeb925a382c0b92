//! The schema AST consumed by the schema extractor and the built-in contract.
//!
//! A [`Schema`] is an ordered list of [`KeySchema`] entries built with the
//! [`Key`] helper:
//!
//! ```
//! use nestform_forms::schema::{Key, Schema, SchemaType};
//!
//! let schema = Schema::new()
//!     .key(Key::required("name").filled(SchemaType::String))
//!     .key(Key::optional("age").maybe(SchemaType::Integer).gteq(18))
//!     .key(Key::optional("bookmarks").array_of(
//!         Schema::new().key(Key::required("url").filled(SchemaType::String)),
//!     ));
//! assert_eq!(schema.keys().len(), 3);
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use regex::Regex;

use nestform_core::Value;

use crate::form_class::FormClass;

/// The declared type of a key.
#[derive(Debug, Clone)]
pub enum SchemaType {
    /// A string.
    String,
    /// A 64-bit integer.
    Integer,
    /// A float.
    Float,
    /// A boolean.
    Bool,
    /// A date (`%Y-%m-%d`).
    Date,
    /// A date and time.
    DateTime,
    /// A time of day.
    Time,
    /// Any value, passed through untouched.
    Any,
    /// A nested object validated by this schema's contract.
    Hash(Schema),
    /// A list of elements of the inner type.
    Array(Box<SchemaType>),
    /// A nested form that carries its own contract.
    Form(Arc<FormClass>),
}

impl SchemaType {
    /// The value type reported to the rendering layer.
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::String => ValueType::String,
            Self::Integer => ValueType::Integer,
            Self::Float => ValueType::Float,
            Self::Bool => ValueType::Bool,
            Self::Date => ValueType::Date,
            Self::DateTime => ValueType::DateTime,
            Self::Time => ValueType::Time,
            Self::Any => ValueType::Any,
            Self::Hash(_) | Self::Form(_) => ValueType::Hash,
            Self::Array(_) => ValueType::Array,
        }
    }
}

/// The coarse type of a field, as seen by field views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Bool,
    Date,
    DateTime,
    Time,
    Any,
    Hash,
    Array,
}

impl ValueType {
    /// The lowercase name, also used as a CSS class and in type messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Time => "time",
            Self::Any => "any",
            Self::Hash => "hash",
            Self::Array => "array",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint checked after type coercion.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Greater than or equal to.
    Gteq(Value),
    /// Strictly greater than.
    Gt(Value),
    /// Less than or equal to.
    Lteq(Value),
    /// Strictly less than.
    Lt(Value),
    /// Minimum length of a string or list.
    MinSize(usize),
    /// Maximum length of a string or list.
    MaxSize(usize),
    /// The string must match the pattern.
    Format(Regex),
    /// The value must be one of the listed values.
    IncludedIn(Vec<Value>),
}

impl Predicate {
    /// The message code used when the predicate fails.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Gteq(_) => "gteq",
            Self::Gt(_) => "gt",
            Self::Lteq(_) => "lteq",
            Self::Lt(_) => "lt",
            Self::MinSize(_) => "min_size",
            Self::MaxSize(_) => "max_size",
            Self::Format(_) => "format",
            Self::IncludedIn(_) => "included_in",
        }
    }

    /// The value substituted for `{n}` in the message template.
    pub fn argument(&self) -> String {
        match self {
            Self::Gteq(v) | Self::Gt(v) | Self::Lteq(v) | Self::Lt(v) => v.to_string(),
            Self::MinSize(n) | Self::MaxSize(n) => n.to_string(),
            Self::Format(re) => re.as_str().to_string(),
            Self::IncludedIn(values) => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Checks a coerced value. Values the predicate does not apply to pass.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Self::Gteq(bound) => compare(value, bound).map_or(true, Ordering::is_ge),
            Self::Gt(bound) => compare(value, bound).map_or(true, Ordering::is_gt),
            Self::Lteq(bound) => compare(value, bound).map_or(true, Ordering::is_le),
            Self::Lt(bound) => compare(value, bound).map_or(true, Ordering::is_lt),
            Self::MinSize(n) => size(value).map_or(true, |len| len >= *n),
            Self::MaxSize(n) => size(value).map_or(true, |len| len <= *n),
            Self::Format(re) => value.as_str().map_or(true, |s| re.is_match(s)),
            Self::IncludedIn(values) => values.contains(value),
        }
    }
}

/// Orders two values of comparable types.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}

fn size(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::List(items) => Some(items.len()),
        Value::Map(map) => Some(map.len()),
        _ => None,
    }
}

/// The declaration of one key in a [`Schema`].
#[derive(Debug, Clone)]
pub struct KeySchema {
    /// The key name.
    pub name: String,
    /// Whether the key must be present.
    pub required: bool,
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// Whether empty strings and lists are rejected.
    pub filled: bool,
    /// The declared type.
    pub ty: SchemaType,
    /// Constraints checked after coercion, in order.
    pub predicates: Vec<Predicate>,
}

impl KeySchema {
    /// Adds a predicate.
    #[must_use]
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Requires the value to be `>= bound`.
    #[must_use]
    pub fn gteq(self, bound: impl Into<Value>) -> Self {
        self.predicate(Predicate::Gteq(bound.into()))
    }

    /// Requires the value to be `> bound`.
    #[must_use]
    pub fn gt(self, bound: impl Into<Value>) -> Self {
        self.predicate(Predicate::Gt(bound.into()))
    }

    /// Requires the value to be `<= bound`.
    #[must_use]
    pub fn lteq(self, bound: impl Into<Value>) -> Self {
        self.predicate(Predicate::Lteq(bound.into()))
    }

    /// Requires the value to be `< bound`.
    #[must_use]
    pub fn lt(self, bound: impl Into<Value>) -> Self {
        self.predicate(Predicate::Lt(bound.into()))
    }

    /// Requires a minimum length.
    #[must_use]
    pub fn min_size(self, n: usize) -> Self {
        self.predicate(Predicate::MinSize(n))
    }

    /// Requires a maximum length.
    #[must_use]
    pub fn max_size(self, n: usize) -> Self {
        self.predicate(Predicate::MaxSize(n))
    }

    /// Requires a string to match a pattern.
    #[must_use]
    pub fn format(self, pattern: Regex) -> Self {
        self.predicate(Predicate::Format(pattern))
    }

    /// Requires the value to be one of `values`.
    #[must_use]
    pub fn included_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicate(Predicate::IncludedIn(
            values.into_iter().map(Into::into).collect(),
        ))
    }
}

/// Starts a key declaration.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    required: bool,
}

impl Key {
    /// A key that must be present.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// A key that may be omitted.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }

    fn finish(self, ty: SchemaType, nullable: bool, filled: bool) -> KeySchema {
        KeySchema {
            name: self.name,
            required: self.required,
            nullable,
            filled,
            ty,
            predicates: Vec::new(),
        }
    }

    /// A non-null, non-empty value of the given type.
    pub fn filled(self, ty: SchemaType) -> KeySchema {
        self.finish(ty, false, true)
    }

    /// A value of the given type or `null`.
    pub fn maybe(self, ty: SchemaType) -> KeySchema {
        self.finish(ty, true, false)
    }

    /// A non-null value of the given type; empty values are accepted.
    pub fn value(self, ty: SchemaType) -> KeySchema {
        self.finish(ty, false, false)
    }

    /// A nested object described by `schema`.
    pub fn hash(self, schema: Schema) -> KeySchema {
        self.finish(SchemaType::Hash(schema), false, false)
    }

    /// A list of values of the given element type.
    pub fn array(self, element: SchemaType) -> KeySchema {
        self.finish(SchemaType::Array(Box::new(element)), false, false)
    }

    /// A list of nested objects described by `schema`.
    pub fn array_of(self, schema: Schema) -> KeySchema {
        self.array(SchemaType::Hash(schema))
    }

    /// A nested form with its own contract.
    pub fn form(self, class: Arc<FormClass>) -> KeySchema {
        self.finish(SchemaType::Form(class), false, false)
    }

    /// A list of nested forms with their own contract.
    pub fn form_list(self, class: Arc<FormClass>) -> KeySchema {
        self.array(SchemaType::Form(class))
    }
}

/// An ordered set of key declarations.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    keys: Vec<KeySchema>,
}

impl Schema {
    /// Creates an empty schema.
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Appends a key declaration.
    #[must_use]
    pub fn key(mut self, key: KeySchema) -> Self {
        self.keys.push(key);
        self
    }

    /// Returns the key declarations in declaration order.
    pub fn keys(&self) -> &[KeySchema] {
        &self.keys
    }

    /// Looks up a key declaration by name.
    pub fn get(&self, name: &str) -> Option<&KeySchema> {
        self.keys.iter().find(|k| k.name == name)
    }
}
