//! Form class descriptors.
//!
//! A [`FormClass`] is built once per form definition: it owns the contract,
//! the field table derived from the contract's schema, the accessor table,
//! the nested list alignment policy and the registered actions. Form nodes
//! share their class through an `Arc`.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nestform_core::{FormResult, ValueMap};

use crate::accessor::{AccessorTable, FieldAccessor};
use crate::contract::Contract;
use crate::info::{self, FieldSpec};
use crate::node::FormNode;
use crate::schema::Schema;
use crate::schema_contract::SchemaContract;

/// How the children of a nested list line up with the record's association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListAlignment {
    /// Children follow the assigned attributes; record items are matched
    /// by index and extra children get no record.
    #[default]
    Attributes,
    /// Children follow the record: extra children are dropped and missing
    /// ones are added empty, so there is exactly one child per record item.
    Record,
}

/// A named action callable through [`FormNode::call`].
pub type ActionHandler = Arc<dyn Fn(&mut FormNode) -> Box<dyn Any> + Send + Sync>;

/// A named defaults hook applied through [`FormNode::apply_default`].
pub type DefaultHandler = Arc<dyn Fn(&FormNode) -> ValueMap + Send + Sync>;

/// The descriptor shared by every node of one form type.
pub struct FormClass {
    namespace: String,
    contract: Option<Arc<dyn Contract>>,
    fields: Vec<FieldSpec>,
    accessors: AccessorTable,
    list_alignment: ListAlignment,
    actions: HashMap<String, ActionHandler>,
    defaults: HashMap<String, DefaultHandler>,
}

impl FormClass {
    /// Defines a form class validated by `contract`.
    ///
    /// Fails with [`FormError::SchemaIntrospection`](nestform_core::FormError)
    /// when the contract exposes no usable schema.
    pub fn new(namespace: impl Into<String>, contract: impl Contract + 'static) -> FormResult<Self> {
        Self::from_contract(namespace, Arc::new(contract))
    }

    /// Defines a form class from a shared contract.
    pub fn from_contract(namespace: impl Into<String>, contract: Arc<dyn Contract>) -> FormResult<Self> {
        let fields = info::extract(contract.as_ref())?;
        Ok(Self::assemble(namespace.into(), Some(contract), fields))
    }

    /// Defines a form class validated by a [`SchemaContract`] without rules.
    pub fn with_schema(namespace: impl Into<String>, schema: Schema) -> FormResult<Self> {
        Self::new(namespace, SchemaContract::new(schema))
    }

    /// Defines a container class: a nested hash validated by its parent's
    /// contract, with no contract of its own.
    pub fn container(namespace: impl Into<String>, schema: &Schema) -> FormResult<Self> {
        let fields = info::extract_schema(schema)?;
        Ok(Self::assemble(namespace.into(), None, fields))
    }

    fn assemble(namespace: String, contract: Option<Arc<dyn Contract>>, fields: Vec<FieldSpec>) -> Self {
        let accessors = AccessorTable::build(&fields);
        tracing::debug!(
            namespace = %namespace,
            fields = fields.len(),
            own_contract = contract.is_some(),
            "form class defined"
        );
        Self {
            namespace,
            contract,
            fields,
            accessors,
            list_alignment: ListAlignment::default(),
            actions: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    /// Sets the nested list alignment policy for this class's list fields.
    #[must_use]
    pub const fn with_list_alignment(mut self, alignment: ListAlignment) -> Self {
        self.list_alignment = alignment;
        self
    }

    /// Registers an action. The handler must return a boxed
    /// [`ActionResult<Value>`](crate::ActionResult); anything else makes
    /// [`FormNode::call`] fail.
    #[must_use]
    pub fn with_action<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut FormNode) -> Box<dyn Any> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(handler));
        self
    }

    /// Registers a defaults hook. The map it computes from the node is
    /// assigned over the node's attributes.
    #[must_use]
    pub fn with_default<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&FormNode) -> ValueMap + Send + Sync + 'static,
    {
        self.defaults.insert(name.into(), Arc::new(handler));
        self
    }

    /// The form namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The key under which request params carry this form's fields.
    pub fn param_key(&self) -> String {
        self.namespace
            .trim()
            .replace("::", "_")
            .replace(['/', ' ', '-'], "_")
            .to_lowercase()
    }

    /// The contract, absent for containers.
    pub fn contract(&self) -> Option<&dyn Contract> {
        self.contract.as_deref()
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The nested fields in declaration order.
    pub fn nested_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_nested())
    }

    /// The accessor table.
    pub const fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    /// Looks up a field accessor.
    pub fn accessor(&self, name: &str) -> Option<&FieldAccessor> {
        self.accessors.get(name)
    }

    /// The nested list alignment policy.
    pub const fn list_alignment(&self) -> ListAlignment {
        self.list_alignment
    }

    /// Looks up a registered action.
    pub fn action(&self, name: &str) -> Option<&ActionHandler> {
        self.actions.get(name)
    }

    /// Looks up a registered defaults hook.
    pub fn default_hook(&self, name: &str) -> Option<&DefaultHandler> {
        self.defaults.get(name)
    }
}

impl fmt::Debug for FormClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        let mut defaults: Vec<_> = self.defaults.keys().collect();
        defaults.sort();
        f.debug_struct("FormClass")
            .field("namespace", &self.namespace)
            .field("contract", &self.contract)
            .field(
                "fields",
                &self.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            )
            .field("list_alignment", &self.list_alignment)
            .field("actions", &actions)
            .field("defaults", &defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Key, SchemaType};

    fn schema() -> Schema {
        Schema::new()
            .key(Key::required("name").filled(SchemaType::String))
            .key(Key::optional("info").hash(Schema::new()))
    }

    #[test]
    fn test_with_schema() {
        let class = FormClass::with_schema("user", schema()).unwrap();
        assert_eq!(class.namespace(), "user");
        assert!(class.contract().is_some());
        assert_eq!(class.fields().len(), 2);
        assert_eq!(class.nested_fields().count(), 1);
        assert!(class.field("name").unwrap().required);
    }

    #[test]
    fn test_container_has_no_contract() {
        let class = FormClass::container("info", &schema()).unwrap();
        assert!(class.contract().is_none());
    }

    #[test]
    fn test_param_key() {
        let class = FormClass::container("Admin::User", &Schema::new()).unwrap();
        assert_eq!(class.param_key(), "admin_user");
    }

    #[test]
    fn test_defaults_and_builders() {
        let class = FormClass::with_schema("user", schema())
            .unwrap()
            .with_list_alignment(ListAlignment::Record)
            .with_action("noop", |_| Box::new(()))
            .with_default("create", |_| ValueMap::new());
        assert_eq!(class.list_alignment(), ListAlignment::Record);
        assert!(class.action("noop").is_some());
        assert!(class.default_hook("create").is_some());
        assert!(class.default_hook("update").is_none());
        assert!(class.action("other").is_none());
        assert!(format!("{class:?}").contains("noop"));
    }
}
