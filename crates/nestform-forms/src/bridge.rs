//! The single point of contact with a node's contract.

use nestform_core::ValueMap;

use crate::contract::{Contract, ContractContext};
use crate::error_tree::ErrorTree;
use crate::node::FormNode;

/// Base error recorded when a contract fails without saying why.
pub const INVALID_MESSAGE: &str = "is invalid";

/// The outcome of one contract call, split into field and base errors.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// Coerced data, partial on failure.
    pub data: ValueMap,
    /// Errors keyed to fields.
    pub field_errors: ErrorTree,
    /// Errors not keyed to any field.
    pub base_errors: Vec<String>,
    /// Whether the contract accepted the attributes.
    pub success: bool,
}

/// Calls `contract` with the node's flat attributes and the node and its
/// record as context.
pub fn run(contract: &dyn Contract, node: &FormNode) -> Validation {
    let attributes = node.to_map();
    let ctx = ContractContext {
        form: node,
        record: node.record(),
    };
    let result = contract.call(&attributes, &ctx);

    let field_errors = result.to_error_map();
    let mut base_errors = result.filter_base_errors();
    if result.is_failure() && field_errors.is_empty() && base_errors.is_empty() {
        base_errors.push(INVALID_MESSAGE.to_string());
    }
    let success = result.is_success();

    Validation {
        data: result.into_data(),
        field_errors,
        base_errors,
        success,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::contract::ContractResult;
    use crate::form_class::FormClass;
    use crate::schema::{Key, Schema, SchemaType};
    use crate::schema_contract::SchemaContract;

    #[derive(Debug)]
    struct Silent(Schema);

    impl Contract for Silent {
        fn schema(&self) -> Option<&Schema> {
            Some(&self.0)
        }

        fn call(&self, values: &ValueMap, _: &ContractContext<'_>) -> ContractResult {
            ContractResult::failed_silently(values.clone())
        }
    }

    #[test]
    fn test_run_splits_errors() {
        let schema = Schema::new().key(Key::required("name").filled(SchemaType::String));
        let class = Arc::new(FormClass::with_schema("user", schema.clone()).unwrap());
        let node = FormNode::new(class);
        let validation = run(&SchemaContract::new(schema), &node);
        assert!(!validation.success);
        assert_eq!(validation.field_errors.messages_for("name"), ["required"]);
        assert!(validation.base_errors.is_empty());
    }

    #[test]
    fn test_silent_failure_becomes_base_error() {
        let class = Arc::new(FormClass::new("user", Silent(Schema::new())).unwrap());
        let node = FormNode::new(Arc::clone(&class));
        let validation = run(&Silent(Schema::new()), &node);
        assert!(!validation.success);
        assert_eq!(validation.base_errors, vec![INVALID_MESSAGE]);
    }
}
