//! The opaque validation contract.
//!
//! A [`Contract`] receives a node's flat attribute map plus a
//! [`ContractContext`] and answers with a [`ContractResult`]: coerced data
//! (partial on failure) and a list of messages. A message with an empty path
//! is a base error; every other message is keyed to a field.
//!
//! The form layer never looks inside a contract beyond
//! [`Contract::schema`], which is used once per form class to derive the
//! field table.

use std::fmt;

use nestform_core::ValueMap;

use crate::error_tree::{ErrorKey, ErrorTree};
use crate::node::FormNode;
use crate::record::RecordRef;
use crate::schema::Schema;

/// Context passed to a contract call.
#[derive(Clone, Copy)]
pub struct ContractContext<'a> {
    /// The form being validated.
    pub form: &'a FormNode,
    /// The form's backing record.
    pub record: Option<&'a RecordRef>,
}

impl fmt::Debug for ContractContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractContext")
            .field("form", &self.form.namespace())
            .field("record", &self.record.is_some())
            .finish()
    }
}

/// One message produced by a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMessage {
    /// Where the error belongs. Empty for base errors.
    pub path: Vec<ErrorKey>,
    /// The display text.
    pub text: String,
}

impl ContractMessage {
    /// A message keyed to a field path.
    pub fn at(path: Vec<ErrorKey>, text: impl Into<String>) -> Self {
        Self {
            path,
            text: text.into(),
        }
    }

    /// A base message, not attributable to a single field.
    pub fn base(text: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            text: text.into(),
        }
    }

    /// Returns `true` for base messages.
    pub fn is_base(&self) -> bool {
        self.path.is_empty()
    }
}

/// The outcome of a contract call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractResult {
    data: ValueMap,
    messages: Vec<ContractMessage>,
    failed: bool,
}

impl ContractResult {
    /// A successful result carrying coerced data.
    pub const fn success(data: ValueMap) -> Self {
        Self {
            data,
            messages: Vec::new(),
            failed: false,
        }
    }

    /// A result built from coerced data and messages; it fails when there
    /// is at least one message.
    pub fn new(data: ValueMap, messages: Vec<ContractMessage>) -> Self {
        let failed = !messages.is_empty();
        Self {
            data,
            messages,
            failed,
        }
    }

    /// A failed result that carries no message.
    pub const fn failed_silently(data: ValueMap) -> Self {
        Self {
            data,
            messages: Vec::new(),
            failed: true,
        }
    }

    /// Whether the contract accepted the input.
    pub const fn is_success(&self) -> bool {
        !self.failed
    }

    /// Whether the contract rejected the input.
    pub const fn is_failure(&self) -> bool {
        self.failed
    }

    /// The messages in the order the contract produced them.
    pub fn messages(&self) -> &[ContractMessage] {
        &self.messages
    }

    /// Builds the field error tree from every keyed message.
    pub fn to_error_map(&self) -> ErrorTree {
        let mut tree = ErrorTree::new();
        for message in self.messages.iter().filter(|m| !m.is_base()) {
            tree.push_message(&message.path, message.text.clone());
        }
        tree
    }

    /// Returns the base messages.
    pub fn filter_base_errors(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.is_base())
            .map(|m| m.text.clone())
            .collect()
    }

    /// The coerced data. Partial when the result failed.
    pub const fn coerced_data(&self) -> &ValueMap {
        &self.data
    }

    /// Consumes the result, returning the coerced data.
    pub fn into_data(self) -> ValueMap {
        self.data
    }
}

/// A validation engine bound to one form class.
pub trait Contract: Send + Sync + fmt::Debug {
    /// Returns the introspectable schema, or `None` when the contract cannot
    /// describe its input.
    fn schema(&self) -> Option<&Schema>;

    /// Validates and coerces a flat attribute map.
    fn call(&self, values: &ValueMap, ctx: &ContractContext<'_>) -> ContractResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_errors() {
        let result = ContractResult::success(ValueMap::new());
        assert!(result.is_success());
        assert!(result.to_error_map().is_empty());
        assert!(result.filter_base_errors().is_empty());
    }

    #[test]
    fn test_split_field_and_base() {
        let result = ContractResult::new(
            ValueMap::new(),
            vec![
                ContractMessage::at(vec![ErrorKey::field("name")], "required"),
                ContractMessage::base("user is read only"),
                ContractMessage::at(
                    vec![ErrorKey::field("bookmarks"), ErrorKey::Index(1), ErrorKey::field("url")],
                    "required",
                ),
            ],
        );
        assert!(result.is_failure());
        assert_eq!(result.filter_base_errors(), vec!["user is read only"]);
        assert_eq!(
            result.to_error_map().to_json(),
            serde_json::json!({"name": ["required"], "bookmarks": {"1": {"url": ["required"]}}})
        );
    }

    #[test]
    fn test_failed_silently() {
        let result = ContractResult::failed_silently(ValueMap::new());
        assert!(result.is_failure());
        assert!(result.messages().is_empty());
    }
}
