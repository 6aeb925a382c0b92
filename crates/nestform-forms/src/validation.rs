//! Recursive validation of a form tree.
//!
//! Each node runs its own contract through the [bridge](crate::bridge), then
//! walks its nested fields in declaration order:
//!
//! - children with their own contract are validated recursively; their
//!   errors are folded in under the field name (and list index), their base
//!   errors are appended to this node's, and their data replaces the slice
//!   the parent contract passed through;
//! - container children (nested hashes validated by this node's contract)
//!   receive their slice of errors and data, then walk their own nested
//!   fields the same way.
//!
//! A node is valid exactly when it ends up with no field errors and no base
//! errors, so a single invalid grandchild invalidates every ancestor.

use std::sync::Arc;

use nestform_core::logging::form_span;
use nestform_core::{Value, ValueMap};

use crate::bridge;
use crate::error_tree::{ErrorKey, ErrorNode, ErrorTree};
use crate::info::{FieldKind, FieldSpec};
use crate::node::{FormNode, Slot};

/// Validates `node` and everything below it. Returns the validity.
pub fn validate(node: &mut FormNode) -> bool {
    let span = form_span(node.namespace());
    let _guard = span.enter();

    bind_children(node);

    let class = Arc::clone(&node.class);
    let (data, errors, base_errors) = match class.contract() {
        Some(contract) => {
            let outcome = bridge::run(contract, node);
            (outcome.data, outcome.field_errors, outcome.base_errors)
        }
        None => (node.to_map(), ErrorTree::new(), Vec::new()),
    };
    finish(node, data, errors, base_errors);

    tracing::debug!(
        form = node.namespace(),
        valid = node.is_valid(),
        field_errors = node.errors.len(),
        base_errors = node.base_errors.len(),
        "form validated"
    );
    node.is_valid()
}

/// Re-binds present nested nodes to the record's associations before the
/// contract sees the attributes.
fn bind_children(node: &mut FormNode) {
    let class = Arc::clone(&node.class);
    for spec in class.nested_fields() {
        if !matches!(node.attributes.get(&spec.name), Some(Slot::One(_) | Slot::Many(_))) {
            continue;
        }
        let bound = match spec.kind {
            FieldKind::NestedObject => node.child(&spec.name).map(|_| ()),
            FieldKind::NestedArray => node.children(&spec.name).map(|_| ()),
            FieldKind::Scalar => Ok(()),
        };
        if let Err(err) = bound {
            tracing::warn!(form = node.namespace(), field = %spec.name, error = %err, "nested field not bound");
        }
        if spec.has_own_contract() {
            continue;
        }
        match node.attributes.get_mut(&spec.name) {
            Some(Slot::One(child)) => bind_children(child),
            Some(Slot::Many(children)) => children.iter_mut().for_each(bind_children),
            _ => {}
        }
    }
}

/// Folds nested results into this node's outcome and stores it.
fn finish(node: &mut FormNode, mut data: ValueMap, mut errors: ErrorTree, mut base_errors: Vec<String>) {
    let class = Arc::clone(&node.class);

    for spec in class.nested_fields() {
        let key = ErrorKey::field(spec.name.clone());
        match node.attributes.get_mut(&spec.name) {
            Some(Slot::One(child)) => {
                let slice = errors.subtree(&key);
                let child_data = nested_child(spec, child, slice, data.get(&spec.name));
                fold_errors(&mut errors, key, child.errors.clone());
                base_errors.extend(child.base_errors.iter().cloned());
                data.insert(spec.name.clone(), child_data);
            }
            Some(Slot::Many(children)) => {
                let slice = errors.subtree(&key);
                let mut list_errors = ErrorTree::new();
                let mut list_data = Vec::with_capacity(children.len());
                for (idx, child) in children.iter_mut().enumerate() {
                    let item_slice = slice.subtree(&ErrorKey::Index(idx));
                    let item_data = data.get(&spec.name).and_then(|d| d.at(idx));
                    list_data.push(nested_child(spec, child, item_slice, item_data));
                    if !child.errors.is_empty() {
                        list_errors.replace(ErrorKey::Index(idx), ErrorNode::Nested(child.errors.clone()));
                    }
                    base_errors.extend(child.base_errors.iter().cloned());
                }
                fold_errors(&mut errors, key, list_errors);
                data.insert(spec.name.clone(), Value::List(list_data));
            }
            Some(Slot::Value(_)) | None => {}
        }
    }

    let order: Vec<&str> = class.fields().iter().map(|f| f.name.as_str()).collect();
    errors.sort_by_fields(&order);

    node.valid = Some(errors.is_empty() && base_errors.is_empty());
    node.data = Some(data);
    node.errors = errors;
    node.base_errors = base_errors;
}

/// Validates or hydrates one child and returns its data for the parent.
///
/// `slice` holds the errors the parent contract reported for the child's
/// field (or list element) and `parent_data` the matching part of the
/// parent's coerced data. Both are ignored for children with their own
/// contract.
fn nested_child(spec: &FieldSpec, child: &mut FormNode, slice: ErrorTree, parent_data: Option<&Value>) -> Value {
    if spec.has_own_contract() {
        validate(child);
    } else {
        let data = parent_data.and_then(Value::as_map).cloned().unwrap_or_default();
        finish(child, data, slice, Vec::new());
    }
    child.data.clone().map_or(Value::Null, Value::Map)
}

/// Stores a child's errors under `key`. Messages the parent contract
/// reported on the field itself take precedence.
fn fold_errors(errors: &mut ErrorTree, key: ErrorKey, child_errors: ErrorTree) {
    if child_errors.is_empty() {
        return;
    }
    if errors.get(&key).and_then(ErrorNode::messages).is_some() {
        return;
    }
    errors.replace(key, ErrorNode::Nested(child_errors));
}
