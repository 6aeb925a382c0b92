//! The per-class accessor table.
//!
//! Built once from a form class's [`FieldSpec`]s, the table decides how an
//! assigned value is stored on a node: scalars go through the
//! blank-to-absent transform, nested maps and lists of maps become child
//! nodes of the field's form class.

use std::collections::HashMap;
use std::sync::Arc;

use nestform_core::settings::Settings;
use nestform_core::{FormResult, Value};

use crate::form_class::FormClass;
use crate::info::{FieldKind, FieldSpec};
use crate::node::{FormNode, Slot};
use crate::params::deep_transform;

/// How a field's value is stored.
#[derive(Debug, Clone)]
pub enum AccessorKind {
    /// A plain value.
    Scalar,
    /// A single child node of the given class.
    One(Arc<FormClass>),
    /// A list of child nodes of the given class.
    Many(Arc<FormClass>),
}

/// Get/set behavior for one field.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    name: String,
    kind: AccessorKind,
}

impl FieldAccessor {
    fn from_spec(spec: &FieldSpec) -> Self {
        let kind = match (&spec.kind, &spec.child) {
            (FieldKind::NestedObject, Some(class)) => AccessorKind::One(Arc::clone(class)),
            (FieldKind::NestedArray, Some(class)) => AccessorKind::Many(Arc::clone(class)),
            _ => AccessorKind::Scalar,
        };
        Self {
            name: spec.name.clone(),
            kind,
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage kind.
    pub const fn kind(&self) -> &AccessorKind {
        &self.kind
    }

    /// Converts an assigned value into the slot stored on the node.
    ///
    /// The blank-to-absent transform runs first, so blank list items are
    /// gone before the shape is looked at. Nested values that are not shaped
    /// like the field (a string assigned to a nested object, say) are stored
    /// as plain values so the contract can report them.
    pub fn assign(&self, value: Value, settings: &Arc<Settings>) -> FormResult<Slot> {
        match (&self.kind, deep_transform(value)) {
            (AccessorKind::One(class), Value::Map(map)) => Ok(Slot::One(Box::new(
                FormNode::from_map(Arc::clone(class), Arc::clone(settings), map)?,
            ))),
            (AccessorKind::Many(class), Value::List(items))
                if items.iter().all(|item| matches!(item, Value::Map(_))) =>
            {
                let nodes = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Map(map) => Some(map),
                        _ => None,
                    })
                    .map(|map| FormNode::from_map(Arc::clone(class), Arc::clone(settings), map))
                    .collect::<FormResult<Vec<_>>>()?;
                Ok(Slot::Many(nodes))
            }
            (_, value) => Ok(Slot::Value(value)),
        }
    }
}

/// The accessors of a form class, in field declaration order.
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    accessors: Vec<FieldAccessor>,
    index: HashMap<String, usize>,
}

impl AccessorTable {
    /// Builds the table for a list of fields.
    pub fn build(fields: &[FieldSpec]) -> Self {
        let accessors: Vec<_> = fields.iter().map(FieldAccessor::from_spec).collect();
        let index = accessors
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), i))
            .collect();
        Self { accessors, index }
    }

    /// Looks up the accessor of a field.
    pub fn get(&self, name: &str) -> Option<&FieldAccessor> {
        self.index.get(name).and_then(|&i| self.accessors.get(i))
    }

    /// Iterates over the accessors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldAccessor> {
        self.accessors.iter()
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Returns `true` for a class without fields.
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Key, Schema, SchemaType};

    fn class() -> FormClass {
        FormClass::container(
            "user",
            &Schema::new()
                .key(Key::required("name").filled(SchemaType::String))
                .key(Key::optional("info").hash(
                    Schema::new().key(Key::optional("age").maybe(SchemaType::Integer)),
                ))
                .key(Key::optional("bookmarks").array_of(
                    Schema::new().key(Key::optional("url").maybe(SchemaType::String)),
                )),
        )
        .unwrap()
    }

    #[test]
    fn test_table_order_and_lookup() {
        let class = class();
        let names: Vec<_> = class.accessors().iter().map(FieldAccessor::name).collect();
        assert_eq!(names, vec!["name", "info", "bookmarks"]);
        assert!(matches!(class.accessors().get("info").unwrap().kind(), AccessorKind::One(_)));
        assert!(class.accessors().get("nope").is_none());
        assert_eq!(class.accessors().len(), 3);
    }

    #[test]
    fn test_assign_scalar_transforms() {
        let class = class();
        let settings = Arc::new(Settings::default());
        let slot = class
            .accessors()
            .get("name")
            .unwrap()
            .assign(Value::from("  x "), &settings)
            .unwrap();
        assert!(matches!(slot, Slot::Value(Value::String(s)) if s == "x"));
    }

    #[test]
    fn test_assign_nested_builds_nodes() {
        let class = class();
        let settings = Arc::new(Settings::default());
        let value = Value::from(serde_json::json!([{"url": "a"}, {"url": " "}]));
        let slot = class
            .accessors()
            .get("bookmarks")
            .unwrap()
            .assign(value, &settings)
            .unwrap();
        let Slot::Many(nodes) = slot else {
            panic!("expected nodes");
        };
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].get("url"), Value::from("a"));
        assert_eq!(nodes[1].get("url"), Value::Null);
    }

    #[test]
    fn test_assign_nested_list_drops_blank_items_first() {
        let class = class();
        let settings = Arc::new(Settings::default());
        let value = Value::from(serde_json::json!([{"url": "a"}, " ", null, {"url": "b"}]));
        let slot = class
            .accessors()
            .get("bookmarks")
            .unwrap()
            .assign(value, &settings)
            .unwrap();
        let Slot::Many(nodes) = slot else {
            panic!("expected nodes");
        };
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].get("url"), Value::from("b"));
    }

    #[test]
    fn test_assign_misshapen_nested_is_value() {
        let class = class();
        let settings = Arc::new(Settings::default());
        let slot = class
            .accessors()
            .get("info")
            .unwrap()
            .assign(Value::from("oops"), &settings)
            .unwrap();
        assert!(matches!(slot, Slot::Value(Value::String(_))));
    }

    #[test]
    fn test_assign_nested_strict_unknown_key() {
        let class = class();
        let settings = Arc::new(Settings::default());
        let value = Value::from(serde_json::json!({"age": 1, "height": 2}));
        let result = class.accessors().get("info").unwrap().assign(value, &settings);
        assert!(result.is_err());
    }
}
