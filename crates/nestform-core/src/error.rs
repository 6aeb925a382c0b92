//! Core error types for the nestform workspace.
//!
//! [`FormError`] covers structural misuse only: schema definition bugs,
//! disallowed parameter objects, unknown attributes in strict mode, and
//! actions that break the result contract. Bad user input never becomes a
//! `FormError`; it is recorded in a form's error tree instead.

use thiserror::Error;

/// The primary error type for nestform.
///
/// Each variant is raised at the point of misuse and is meant to be fixed by
/// the caller rather than shown to an end user.
#[derive(Error, Debug)]
pub enum FormError {
    // ── Definition time ──────────────────────────────────────────────

    /// A contract did not expose an introspectable schema.
    #[error("Schema introspection error: {0}")]
    SchemaIntrospection(String),

    // ── Assignment ───────────────────────────────────────────────────

    /// A parameter key does not name a field of the form (strict mode only).
    #[error("Unknown attribute `{attribute}` for form `{form}`")]
    UnknownAttribute {
        /// The form namespace.
        form: String,
        /// The offending key.
        attribute: String,
    },

    /// A framework request-parameter wrapper reached attribute assignment
    /// while the settings forbid it.
    #[error("Params not allowed: {0}")]
    ParamsNotAllowed(String),

    /// A nested accessor was used on a field that is not nested.
    #[error("Field `{field}` of form `{form}` is not a nested form")]
    NotNested {
        /// The form namespace.
        form: String,
        /// The field name.
        field: String,
    },

    // ── Actions ──────────────────────────────────────────────────────

    /// A wrapped action returned something other than an action result.
    #[error("Action result type error: method `{0}` should be returning an action result")]
    ActionResultType(String),

    /// No action with the given name is registered on the form class.
    #[error("Unknown action `{action}` for form `{form}`")]
    UnknownAction {
        /// The form namespace.
        form: String,
        /// The requested action name.
        action: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    /// Returns `true` for errors raised while defining a form class, which
    /// can never succeed on retry.
    pub const fn is_definition_error(&self) -> bool {
        matches!(self, Self::SchemaIntrospection(_))
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attribute_display() {
        let err = FormError::UnknownAttribute {
            form: "user".into(),
            attribute: "nickname".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown attribute `nickname` for form `user`"
        );
    }

    #[test]
    fn test_action_result_type_display() {
        let err = FormError::ActionResultType("create".into());
        assert!(err.to_string().contains("method `create`"));
    }

    #[test]
    fn test_definition_error() {
        assert!(FormError::SchemaIntrospection("x".into()).is_definition_error());
        assert!(!FormError::ParamsNotAllowed("x".into()).is_definition_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
