//! # nestform
//!
//! Schema-bound nested form objects for Rust.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `nestform` to get everything, or depend on individual
//! crates for finer-grained control.

/// Values, settings, error types, and logging setup.
pub use nestform_core as core;

/// `QueryDict` and bracket-notation param expansion.
#[cfg(feature = "http")]
pub use nestform_http as http;

/// Form classes, form trees, validation, and actions.
#[cfg(feature = "forms")]
pub use nestform_forms as forms;

/// Third-party crates used in public signatures.
pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;

/// Common imports for building and using forms.
///
/// ```
/// use nestform::prelude::*;
///
/// let class = std::sync::Arc::new(
///     FormClass::with_schema(
///         "user",
///         Schema::new().key(Key::required("name").filled(SchemaType::String)),
///     )
///     .unwrap(),
/// );
/// let mut form = FormNode::new(class);
/// form.set("name", "Ivan").unwrap();
/// assert!(form.validate());
/// ```
pub mod prelude {
    pub use nestform_core::settings::Settings;
    pub use nestform_core::{FormError, FormResult, Value, ValueMap};

    #[cfg(feature = "http")]
    pub use nestform_http::QueryDict;

    #[cfg(feature = "forms")]
    pub use nestform_forms::{
        ActionFailure, ActionResult, Contract, ContractContext, ContractResult, ErrorTree,
        FormClass, FormNode, HashRecord, Key, Record, RecordRef, Rule, Schema, SchemaContract,
        SchemaType,
    };
}
