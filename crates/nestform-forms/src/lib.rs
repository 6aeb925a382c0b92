//! # nestform-forms
//!
//! Schema-bound form objects for nestform. A [`FormClass`] is defined once
//! from a [`Contract`] (usually a [`SchemaContract`] over a [`Schema`]); each
//! request builds a [`FormNode`] tree from nested params, reads defaults from
//! a backing [`Record`], validates recursively, and hands the coerced data to
//! an action.
//!
//! ```
//! use std::sync::Arc;
//!
//! use nestform_core::Value;
//! use nestform_forms::{FormClass, FormNode, Key, Schema, SchemaType};
//!
//! let class = Arc::new(
//!     FormClass::with_schema(
//!         "user",
//!         Schema::new().key(Key::required("name").filled(SchemaType::String)),
//!     )
//!     .unwrap(),
//! );
//!
//! let mut form = FormNode::new(class);
//! form.set("name", "  Ivan ").unwrap();
//! assert!(form.validate());
//! assert_eq!(form.get("name"), Value::from("Ivan"));
//! ```

pub mod accessor;
pub mod action;
pub mod bound_field;
pub mod bridge;
pub mod coerce;
pub mod contract;
pub mod error_tree;
pub mod form_class;
pub mod info;
pub mod node;
pub mod params;
pub mod record;
pub mod schema;
pub mod schema_contract;
pub mod validation;

pub use action::{ActionFailure, ActionResult};
pub use bound_field::{FieldView, InputType};
pub use contract::{Contract, ContractContext, ContractMessage, ContractResult};
pub use error_tree::{ErrorKey, ErrorNode, ErrorTree};
pub use form_class::{ActionHandler, DefaultHandler, FormClass, ListAlignment};
pub use info::{FieldInfo, FieldKind, FieldSpec};
pub use node::FormNode;
pub use params::Params;
pub use record::{Association, HashRecord, Record, RecordRef};
pub use schema::{Key, KeySchema, Predicate, Schema, SchemaType, ValueType};
pub use schema_contract::{Rule, RuleContext, SchemaContract};
