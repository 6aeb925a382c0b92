//! Render-facing views of form fields.
//!
//! A [`FieldView`] pairs one field of a node with its current value, its
//! errors and the input flavor a renderer should use. No markup is produced
//! here; renderers read the view.

use nestform_core::utils::text::humanize;
use nestform_core::Value;

use crate::error_tree::{ErrorKey, ErrorNode};
use crate::node::FormNode;
use crate::schema::ValueType;

/// The kind of input a field should render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Date,
    DateTime,
    Number,
    Checkbox,
    Password,
    Email,
    Tel,
    Url,
    Text,
}

impl InputType {
    /// Picks the input type from the field type, then from the field name.
    ///
    /// # Examples
    ///
    /// ```
    /// use nestform_forms::bound_field::InputType;
    /// use nestform_forms::schema::ValueType;
    ///
    /// assert_eq!(InputType::for_field("age", ValueType::Integer), InputType::Number);
    /// assert_eq!(InputType::for_field("contact_email", ValueType::String), InputType::Email);
    /// ```
    pub fn for_field(name: &str, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Date => Self::Date,
            ValueType::DateTime => Self::DateTime,
            ValueType::Integer => Self::Number,
            ValueType::Bool => Self::Checkbox,
            _ if name.contains("password") => Self::Password,
            _ if name.contains("email") => Self::Email,
            _ if name.contains("phone") => Self::Tel,
            _ if name.contains("url") => Self::Url,
            _ => Self::Text,
        }
    }

    /// The HTML input type name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Password => "password",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Text => "text",
        }
    }
}

/// One field of a node, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    /// The field name.
    pub name: String,
    /// The name of the request param, e.g. `user[name]`.
    pub html_name: String,
    /// The declared type.
    pub value_type: ValueType,
    /// The input flavor.
    pub input_type: InputType,
    /// Whether the field is required.
    pub required: bool,
    /// The current value, as read through the node.
    pub value: Value,
    /// The field's messages; nested messages are flattened.
    pub errors: Vec<String>,
}

impl FieldView {
    /// CSS classes for the field wrapper.
    pub fn css_classes(&self) -> Vec<String> {
        let mut classes = vec![
            "input".to_string(),
            self.value_type.as_str().to_string(),
            self.name.clone(),
        ];
        if self.required {
            classes.push("required".to_string());
        }
        if self.has_errors() {
            classes.push("error".to_string());
        }
        classes
    }

    /// Returns `true` when the field has messages.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The messages joined for display, or `None` without errors.
    pub fn error_text(&self) -> Option<String> {
        self.has_errors().then(|| self.errors.join(", "))
    }
}

impl FormNode {
    /// Builds the view of a field, or `None` for an unknown field.
    pub fn field_view(&self, name: &str) -> Option<FieldView> {
        let spec = self.class.field(name)?;
        let errors = self.errors.field(name).map(ErrorNode::flatten).unwrap_or_default();
        Some(FieldView {
            name: spec.name.clone(),
            html_name: format!("{}[{}]", self.param_key(), spec.name),
            value_type: spec.value_type,
            input_type: InputType::for_field(&spec.name, spec.value_type),
            required: spec.required,
            value: self.get(name),
            errors,
        })
    }

    /// Flattens the error tree into display lines.
    ///
    /// Field messages read `Label: msg1,msg2`; messages of a nested object
    /// read `Nested label: ...`; messages of a list element read
    /// `Nested label (n): ...` with one-based positions.
    pub fn errors_full_messages(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (key, node) in self.errors.iter() {
            match node {
                ErrorNode::Messages(msgs) => {
                    lines.push(format!("{}: {}", humanize(&key.to_string()), msgs.join(",")));
                }
                ErrorNode::Nested(tree) => {
                    for (nested_key, nested) in tree.iter() {
                        match (nested_key, nested) {
                            (ErrorKey::Index(idx), ErrorNode::Nested(item)) => {
                                for (field, item_errors) in item.iter() {
                                    lines.push(format!(
                                        "{} ({}): {}",
                                        humanize(&field.to_string()),
                                        idx + 1,
                                        item_errors.flatten().join(",")
                                    ));
                                }
                            }
                            (ErrorKey::Index(idx), ErrorNode::Messages(msgs)) => {
                                lines.push(format!(
                                    "{} ({}): {}",
                                    humanize(&key.to_string()),
                                    idx + 1,
                                    msgs.join(",")
                                ));
                            }
                            (ErrorKey::Field(field), nested) => {
                                lines.push(format!(
                                    "{}: {}",
                                    humanize(field),
                                    nested.flatten().join(",")
                                ));
                            }
                        }
                    }
                }
            }
        }
        lines
    }
}
