//! Schema introspection: the field table of a form class.
//!
//! [`extract`] walks a contract's [`Schema`] once, at form class definition,
//! and produces one [`FieldSpec`] per top-level key. Nested hashes and
//! arrays of hashes become container form classes built from their
//! sub-schema; keys typed as another form class keep that class and its
//! contract.

use std::collections::HashSet;
use std::sync::Arc;

use nestform_core::{FormError, FormResult};

use crate::contract::Contract;
use crate::form_class::FormClass;
use crate::schema::{Schema, SchemaType, ValueType};

/// How a field is stored on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain value.
    Scalar,
    /// A single nested form.
    NestedObject,
    /// A list of nested forms.
    NestedArray,
}

/// One field of a form class.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// The field name, also the association name on the record.
    pub name: String,
    /// Scalar or nested.
    pub kind: FieldKind,
    /// The declared type.
    pub value_type: ValueType,
    /// Whether the schema marks the key as required.
    pub required: bool,
    /// The form class of nested elements.
    pub child: Option<Arc<FormClass>>,
}

impl FieldSpec {
    /// Returns `true` for nested objects and arrays.
    pub fn is_nested(&self) -> bool {
        self.kind != FieldKind::Scalar
    }

    /// Returns `true` when nested elements are validated by their own
    /// contract rather than by this form's contract.
    pub fn has_own_contract(&self) -> bool {
        self.child.as_ref().is_some_and(|c| c.contract().is_some())
    }

    /// The rendering-facing summary of this field.
    pub const fn info(&self) -> FieldInfo {
        FieldInfo {
            value_type: self.value_type,
            required: self.required,
        }
    }
}

/// What the rendering layer needs to know about a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// The declared type.
    pub value_type: ValueType,
    /// Whether the field is required.
    pub required: bool,
}

/// Extracts the field table from a contract.
pub fn extract(contract: &dyn Contract) -> FormResult<Vec<FieldSpec>> {
    let schema = contract.schema().ok_or_else(|| {
        FormError::SchemaIntrospection(format!("contract {contract:?} exposes no schema"))
    })?;
    extract_schema(schema)
}

/// Extracts the field table from a schema.
pub fn extract_schema(schema: &Schema) -> FormResult<Vec<FieldSpec>> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(schema.keys().len());

    for key in schema.keys() {
        if !seen.insert(key.name.as_str()) {
            return Err(FormError::SchemaIntrospection(format!(
                "duplicate key `{}`",
                key.name
            )));
        }

        let (kind, child) = match &key.ty {
            SchemaType::Hash(sub) => (
                FieldKind::NestedObject,
                Some(Arc::new(FormClass::container(key.name.clone(), sub)?)),
            ),
            SchemaType::Form(class) => (FieldKind::NestedObject, Some(Arc::clone(class))),
            SchemaType::Array(element) => match element.as_ref() {
                SchemaType::Hash(sub) => (
                    FieldKind::NestedArray,
                    Some(Arc::new(FormClass::container(key.name.clone(), sub)?)),
                ),
                SchemaType::Form(class) => (FieldKind::NestedArray, Some(Arc::clone(class))),
                _ => (FieldKind::Scalar, None),
            },
            _ => (FieldKind::Scalar, None),
        };

        fields.push(FieldSpec {
            name: key.name.clone(),
            kind,
            value_type: key.ty.value_type(),
            required: key.required,
            child,
        });
    }

    Ok(fields)
}
