//! Actions wrapped with a validation pre-check.
//!
//! [`FormNode::perform`] validates the whole tree first and only runs the
//! action on a valid form. A [`ActionFailure::Service`] returned by the
//! action is copied into the form's base errors so it can be displayed next
//! to the fields; the result is still handed back unchanged.
//!
//! ```
//! use std::sync::Arc;
//!
//! use nestform_forms::{ActionFailure, ActionResult, FormClass, FormNode, Key, Schema, SchemaType};
//!
//! let class = Arc::new(
//!     FormClass::with_schema(
//!         "user",
//!         Schema::new().key(Key::required("name").filled(SchemaType::String)),
//!     )
//!     .unwrap(),
//! );
//! let mut form = FormNode::new(class);
//!
//! let result = form.perform(|_| ActionResult::Success(1));
//! assert_eq!(result, ActionResult::Failure(ActionFailure::ValidateInvalid));
//! ```

use std::any::Any;

use nestform_core::{FormError, FormResult, Value};

use crate::node::FormNode;

/// Why an action failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFailure {
    /// The form did not validate; the action was not run.
    ValidateInvalid,
    /// The domain layer refused; the messages become base errors.
    Service(Vec<String>),
    /// Any other failure, passed through untouched.
    Other(String),
}

/// The result every action must return.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    /// The action succeeded.
    Success(T),
    /// The action failed.
    Failure(ActionFailure),
}

impl<T> ActionResult<T> {
    /// Returns `true` for [`ActionResult::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`ActionResult::Failure`].
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the failure, if any.
    pub const fn failure(&self) -> Option<&ActionFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Success(_) => None,
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<T, ActionFailure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl FormNode {
    /// Validates the form, then runs `action` on it if it is valid.
    pub fn perform<T, F>(&mut self, action: F) -> ActionResult<T>
    where
        F: FnOnce(&mut Self) -> ActionResult<T>,
    {
        if !self.validate() {
            tracing::info!(form = self.namespace(), "action skipped: form is invalid");
            return ActionResult::Failure(ActionFailure::ValidateInvalid);
        }

        tracing::debug!(form = self.namespace(), "running action");
        let result = action(self);
        self.record_failure(result.failure());
        result
    }

    /// Runs an action registered on the form class by name.
    ///
    /// Fails with [`FormError::UnknownAction`] for an unregistered name and
    /// with [`FormError::ActionResultType`] when the handler returns anything
    /// but an `ActionResult<Value>`.
    pub fn call(&mut self, name: &str) -> FormResult<ActionResult<Value>> {
        let Some(handler) = self.class.action(name).cloned() else {
            return Err(FormError::UnknownAction {
                form: self.namespace().to_string(),
                action: name.to_string(),
            });
        };

        if !self.validate() {
            tracing::info!(form = self.namespace(), action = name, "action skipped: form is invalid");
            return Ok(ActionResult::Failure(ActionFailure::ValidateInvalid));
        }

        tracing::debug!(form = self.namespace(), action = name, "running action");
        let returned: Box<dyn Any> = handler(self);
        let result = returned
            .downcast::<ActionResult<Value>>()
            .map_err(|_| FormError::ActionResultType(name.to_string()))?;
        self.record_failure(result.failure());
        Ok(*result)
    }

    /// Runs a defaults hook registered on the form class by name and
    /// assigns the map it returns over the current attributes.
    ///
    /// Fails with [`FormError::UnknownAction`] for an unregistered name, and
    /// like [`FormNode::set_attributes`] for keys that are not fields.
    pub fn apply_default(&mut self, name: &str) -> FormResult<()> {
        let Some(hook) = self.class.default_hook(name).cloned() else {
            return Err(FormError::UnknownAction {
                form: self.namespace().to_string(),
                action: name.to_string(),
            });
        };
        let defaults = hook(&*self);
        tracing::debug!(form = self.namespace(), hook = name, keys = defaults.len(), "defaults applied");
        self.set_attributes(defaults)
    }

    fn record_failure(&mut self, failure: Option<&ActionFailure>) {
        if let Some(ActionFailure::Service(messages)) = failure {
            tracing::info!(form = self.namespace(), errors = messages.len(), "action failed in service");
            self.base_errors.clone_from(messages);
            self.valid = Some(false);
        }
    }
}
