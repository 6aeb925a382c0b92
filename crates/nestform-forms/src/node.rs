//! Form nodes: one schema-bound, validatable object in a nested form tree.
//!
//! A [`FormNode`] stores assigned attributes, reads defaults from its
//! record, and owns its nested child nodes exclusively. Child nodes are
//! created when params assign a nested key, or lazily (and memoized) the
//! first time a nested accessor is read; every read re-binds the child to
//! the parent record's association of the same name.
//!
//! ```
//! use std::sync::Arc;
//!
//! use nestform_core::{Value, ValueMap};
//! use nestform_forms::{FormClass, FormNode, HashRecord, Key, Schema, SchemaType};
//!
//! let class = Arc::new(
//!     FormClass::with_schema(
//!         "user",
//!         Schema::new()
//!             .key(Key::required("name").filled(SchemaType::String))
//!             .key(Key::optional("bookmarks").array_of(
//!                 Schema::new().key(Key::required("url").filled(SchemaType::String)),
//!             )),
//!     )
//!     .unwrap(),
//! );
//!
//! let record = HashRecord::shared(ValueMap::from([(
//!     "bookmarks".to_string(),
//!     Value::from(serde_json::json!([{"url": "a"}, {"url": "b"}])),
//! )]));
//! let mut form = FormNode::new(class).with_record(record);
//!
//! let bookmarks = form.children("bookmarks").unwrap();
//! assert_eq!(bookmarks.len(), 2);
//! assert_eq!(bookmarks[1].get("url"), Value::from("b"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nestform_core::settings::Settings;
use nestform_core::{FormError, FormResult, Value, ValueMap};

use crate::accessor::AccessorKind;
use crate::error_tree::{ErrorKey, ErrorTree};
use crate::form_class::{FormClass, ListAlignment};
use crate::info::FieldInfo;
use crate::params::Params;
use crate::record::{Association, RecordRef};
use crate::validation;

/// The stored value of one attribute.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A scalar, or a nested value that was not shaped like its field.
    Value(Value),
    /// A single nested node.
    One(Box<FormNode>),
    /// A list of nested nodes.
    Many(Vec<FormNode>),
}

impl Slot {
    /// Renders the slot as a plain value; nested nodes become maps of their
    /// attributes.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::One(node) => Value::Map(node.to_map()),
            Self::Many(nodes) => Value::List(nodes.iter().map(|n| Value::Map(n.to_map())).collect()),
        }
    }
}

/// One node of a nested form tree.
#[derive(Clone)]
pub struct FormNode {
    pub(crate) class: Arc<FormClass>,
    pub(crate) settings: Arc<Settings>,
    pub(crate) attributes: BTreeMap<String, Slot>,
    pub(crate) record: Option<RecordRef>,
    pub(crate) errors: ErrorTree,
    pub(crate) base_errors: Vec<String>,
    pub(crate) data: Option<ValueMap>,
    pub(crate) valid: Option<bool>,
}

impl FormNode {
    /// Creates an empty node with default settings.
    pub fn new(class: Arc<FormClass>) -> Self {
        Self::with_settings(class, Arc::new(Settings::default()))
    }

    /// Creates an empty node with the given settings. Nested nodes inherit
    /// them.
    pub fn with_settings(class: Arc<FormClass>, settings: Arc<Settings>) -> Self {
        Self {
            class,
            settings,
            attributes: BTreeMap::new(),
            record: None,
            errors: ErrorTree::new(),
            base_errors: Vec::new(),
            data: None,
            valid: None,
        }
    }

    /// Creates a node and assigns `attributes`.
    pub fn from_map(class: Arc<FormClass>, settings: Arc<Settings>, attributes: ValueMap) -> FormResult<Self> {
        let mut node = Self::with_settings(class, settings);
        node.set_attributes(attributes)?;
        Ok(node)
    }

    /// Builds a node from a plain value under `settings`: a map is assigned
    /// as attributes, `null` gives an empty node.
    pub fn wrap(class: Arc<FormClass>, settings: Arc<Settings>, value: Value) -> FormResult<Self> {
        match value {
            Value::Map(map) => Self::from_map(class, settings, map),
            Value::Null => Ok(Self::with_settings(class, settings)),
            other => Err(FormError::ConfigurationError(format!(
                "cannot build form `{}` from a {} value",
                class.namespace(),
                other.type_name()
            ))),
        }
    }

    /// Sets the backing record.
    #[must_use]
    pub fn with_record(mut self, record: RecordRef) -> Self {
        self.record = Some(record);
        self
    }

    /// Replaces the backing record.
    pub fn set_record(&mut self, record: Option<RecordRef>) {
        self.record = record;
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// The form class.
    pub const fn class(&self) -> &Arc<FormClass> {
        &self.class
    }

    /// The settings this node was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The form namespace.
    pub fn namespace(&self) -> &str {
        self.class.namespace()
    }

    /// The key under which request params carry this form's fields.
    pub fn param_key(&self) -> String {
        self.class.param_key()
    }

    /// The backing record.
    pub const fn record(&self) -> Option<&RecordRef> {
        self.record.as_ref()
    }

    /// Whether the backing record has been saved.
    pub fn is_persisted(&self) -> bool {
        self.record.as_ref().is_some_and(|r| r.is_persisted())
    }

    /// The record id.
    pub fn id(&self) -> Option<Value> {
        self.record.as_ref().and_then(|r| r.id())
    }

    /// The record id as a one-element key, if any.
    pub fn to_key(&self) -> Option<Vec<Value>> {
        self.id().map(|id| vec![id])
    }

    /// The record id as a URL parameter; empty without an id.
    pub fn to_param(&self) -> String {
        self.id().map(|id| id.to_string()).unwrap_or_default()
    }

    /// Type and required flag of a field, for the rendering layer.
    pub fn info(&self, field: &str) -> Option<FieldInfo> {
        self.class.field(field).map(crate::info::FieldSpec::info)
    }

    // ── Assignment ───────────────────────────────────────────────────

    /// Assigns one field.
    ///
    /// Scalars are stored after the blank-to-absent transform; maps and
    /// lists of maps assigned to nested fields replace the existing children.
    /// An unknown name fails in strict mode and is dropped otherwise.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> FormResult<()> {
        let Some(accessor) = self.class.accessor(name) else {
            return self.unknown_attribute(name);
        };
        let slot = accessor.assign(value.into(), &self.settings)?;
        tracing::trace!(form = self.class.namespace(), field = name, "attribute assigned");
        self.attributes.insert(name.to_string(), slot);
        Ok(())
    }

    /// Assigns an existing node to a nested object field.
    pub fn set_node(&mut self, name: &str, node: Self) -> FormResult<()> {
        match self.class.accessor(name).map(|a| a.kind()) {
            Some(AccessorKind::One(_)) => {
                self.attributes.insert(name.to_string(), Slot::One(Box::new(node)));
                Ok(())
            }
            Some(_) => Err(self.not_nested(name)),
            None => self.unknown_attribute(name),
        }
    }

    /// Assigns existing nodes to a nested list field.
    pub fn set_nodes(&mut self, name: &str, nodes: Vec<Self>) -> FormResult<()> {
        match self.class.accessor(name).map(|a| a.kind()) {
            Some(AccessorKind::Many(_)) => {
                self.attributes.insert(name.to_string(), Slot::Many(nodes));
                Ok(())
            }
            Some(_) => Err(self.not_nested(name)),
            None => self.unknown_attribute(name),
        }
    }

    /// Assigns every entry of a map.
    pub fn set_attributes(&mut self, attributes: ValueMap) -> FormResult<()> {
        for (name, value) in attributes {
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Assigns request params.
    ///
    /// When the params hold a map under this form's param key, only that map
    /// is used; otherwise the whole params map is. A [`Params::Query`] is
    /// expanded into a nested map only when `allow_query_params` is set.
    pub fn set_params(&mut self, params: impl Into<Params>) -> FormResult<()> {
        let mut map = match params.into() {
            Params::Map(map) => map,
            Params::Query(query) => {
                if !self.settings.allow_query_params {
                    return Err(FormError::ParamsNotAllowed(
                        "pass a nested map instead of a QueryDict or set `allow_query_params` to true"
                            .to_string(),
                    ));
                }
                query.to_nested()
            }
        };

        let key = self.param_key();
        let form_params = match map.remove(&key) {
            Some(Value::Map(inner)) => inner,
            Some(other) => {
                map.insert(key, other);
                map
            }
            None => map,
        };
        self.set_attributes(form_params)
    }

    fn unknown_attribute(&self, name: &str) -> FormResult<()> {
        if self.settings.strict_param_keys {
            return Err(FormError::UnknownAttribute {
                form: self.class.namespace().to_string(),
                attribute: name.to_string(),
            });
        }
        tracing::warn!(
            form = self.class.namespace(),
            attribute = name,
            "unknown attribute dropped"
        );
        Ok(())
    }

    fn not_nested(&self, name: &str) -> FormError {
        FormError::NotNested {
            form: self.class.namespace().to_string(),
            field: name.to_string(),
        }
    }

    // ── Reading ──────────────────────────────────────────────────────

    /// Reads a field.
    ///
    /// Coerced data from the last validation wins, then the assigned
    /// attribute, then the record's field of the same name. Nested fields
    /// read as maps (or lists of maps) of their attributes.
    pub fn get(&self, name: &str) -> Value {
        if let Some(value) = self.data.as_ref().and_then(|data| data.get(name)) {
            return value.clone();
        }
        if let Some(slot) = self.attributes.get(name) {
            return slot.to_value();
        }
        self.record
            .as_ref()
            .and_then(|record| record.get(name))
            .unwrap_or_default()
    }

    /// The assigned attributes.
    pub const fn attributes(&self) -> &BTreeMap<String, Slot> {
        &self.attributes
    }

    /// The assigned attributes as a flat map, the input of the contract.
    pub fn to_map(&self) -> ValueMap {
        self.attributes
            .iter()
            .map(|(name, slot)| (name.clone(), slot.to_value()))
            .collect()
    }

    /// The nested object node of a field, created on first read.
    ///
    /// The node is re-bound to the record's association of the same name on
    /// every call.
    pub fn child(&mut self, name: &str) -> FormResult<&mut Self> {
        let class = self.nested_class(name, false)?;
        let record = self.association(name).one();

        if !matches!(self.attributes.get(name), Some(Slot::One(_))) {
            let node = self.fresh_child(Arc::clone(&class), name, None);
            self.attributes.insert(name.to_string(), Slot::One(Box::new(node)));
        }
        match self.attributes.get_mut(name) {
            Some(Slot::One(node)) => {
                node.record = record;
                Ok(node.as_mut())
            }
            _ => Err(FormError::NotNested {
                form: class.namespace().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// The nested list nodes of a field.
    ///
    /// Without assigned entries, one node is created per item of the
    /// record's association. Existing nodes are re-bound by index; how
    /// mismatched lengths are resolved depends on the class's
    /// [`ListAlignment`].
    pub fn children(&mut self, name: &str) -> FormResult<&mut [Self]> {
        let class = self.nested_class(name, true)?;
        let association = self.association(name);
        let records = association.many();

        let needs_build = match self.attributes.get(name) {
            Some(Slot::Many(_)) => false,
            Some(Slot::Value(value)) if !value.is_null() => return Ok(&mut []),
            _ => true,
        };
        if needs_build {
            let nodes = (0..records.len())
                .map(|idx| self.fresh_child(Arc::clone(&class), name, Some(idx)))
                .collect();
            self.attributes.insert(name.to_string(), Slot::Many(nodes));
        }

        let align_to_record = self.class.list_alignment() == ListAlignment::Record
            && !matches!(association, Association::None);
        let settings = Arc::clone(&self.settings);
        let Some(Slot::Many(nodes)) = self.attributes.get_mut(name) else {
            return Ok(&mut []);
        };
        if align_to_record {
            nodes.truncate(records.len());
            while nodes.len() < records.len() {
                nodes.push(Self::with_settings(Arc::clone(&class), Arc::clone(&settings)));
            }
        }
        for (idx, node) in nodes.iter_mut().enumerate() {
            node.record = records.get(idx).cloned();
        }
        Ok(nodes)
    }

    /// The nested object node of a field, if one was assigned or read.
    pub fn child_ref(&self, name: &str) -> Option<&Self> {
        match self.attributes.get(name) {
            Some(Slot::One(node)) => Some(node),
            _ => None,
        }
    }

    /// The nested list nodes of a field, if any were assigned or read.
    pub fn children_ref(&self, name: &str) -> &[Self] {
        match self.attributes.get(name) {
            Some(Slot::Many(nodes)) => nodes,
            _ => &[],
        }
    }

    fn nested_class(&self, name: &str, list: bool) -> FormResult<Arc<FormClass>> {
        match (self.class.accessor(name).map(|a| a.kind()), list) {
            (Some(AccessorKind::One(class)), false) | (Some(AccessorKind::Many(class)), true) => {
                Ok(Arc::clone(class))
            }
            _ => Err(self.not_nested(name)),
        }
    }

    fn association(&self, name: &str) -> Association {
        self.record
            .as_ref()
            .map_or(Association::None, |record| record.association(name))
    }

    /// A new child; after validation it receives its slice of this node's
    /// errors and data.
    fn fresh_child(&self, class: Arc<FormClass>, name: &str, idx: Option<usize>) -> Self {
        let mut node = Self::with_settings(class, Arc::clone(&self.settings));
        if self.valid.is_none() {
            return node;
        }

        let key = ErrorKey::field(name);
        let mut errors = self.errors.subtree(&key);
        let mut data = self.data.as_ref().and_then(|d| d.get(name));
        if let Some(idx) = idx {
            errors = errors.subtree(&ErrorKey::Index(idx));
            data = data.and_then(|d| d.at(idx));
        }
        node.valid = Some(errors.is_empty());
        node.errors = errors;
        node.data = data.and_then(Value::as_map).cloned();
        node
    }

    // ── Validation results ───────────────────────────────────────────

    /// Validates this node and its nested nodes. Returns the validity.
    pub fn validate(&mut self) -> bool {
        validation::validate(self)
    }

    /// Whether the last validation passed. `false` before validation.
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// The validity of the last validation, `None` before validation.
    pub const fn validity(&self) -> Option<bool> {
        self.valid
    }

    /// Field errors of the last validation. Empty before validation.
    pub const fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    /// Base errors of the last validation and failed actions.
    pub fn base_errors(&self) -> &[String] {
        &self.base_errors
    }

    /// Coerced data of the last validation.
    pub const fn data(&self) -> Option<&ValueMap> {
        self.data.as_ref()
    }
}

impl fmt::Debug for FormNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormNode")
            .field("namespace", &self.class.namespace())
            .field("attributes", &self.attributes)
            .field("record", &self.record)
            .field("errors", &self.errors)
            .field("base_errors", &self.base_errors)
            .field("data", &self.data)
            .field("valid", &self.valid)
            .finish()
    }
}
