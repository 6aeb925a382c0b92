//! The built-in [`Contract`]: a [`Schema`] checked key by key, followed by
//! custom rules.
//!
//! Checking a key runs, in order: presence (`required`), nullability,
//! `filled`, type coercion, then the key's predicates, stopping at the first
//! failure. Coerced values of passing keys form the result data; nested hashes
//! contribute their partial data even when some of their keys fail. Keys not
//! declared in the schema are dropped from the data.
//!
//! Rules run after the schema. A key rule is skipped when its key already
//! has a schema error; base rules always run.
//!
//! # Examples
//!
//! ```
//! use nestform_forms::{Key, Rule, Schema, SchemaContract, SchemaType};
//!
//! let contract = SchemaContract::new(
//!     Schema::new()
//!         .key(Key::required("password").filled(SchemaType::String))
//!         .key(Key::required("password_confirmation").filled(SchemaType::String)),
//! )
//! .rule(Rule::key("password_confirmation", |ctx| {
//!     (ctx.value("password") != ctx.value("password_confirmation"))
//!         .then(|| "does not match".to_string())
//! }))
//! .message("required", "can't be blank");
//! # let _ = contract;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nestform_core::settings::Settings;
use nestform_core::utils::text::interpolate;
use nestform_core::{Value, ValueMap};

use crate::coerce::{coerce_scalar, type_code};
use crate::contract::{Contract, ContractContext, ContractMessage, ContractResult};
use crate::error_tree::ErrorKey;
use crate::node::FormNode;
use crate::record::RecordRef;
use crate::schema::{KeySchema, Schema, SchemaType, ValueType};

static NULL: Value = Value::Null;

/// The built-in message template for an error code.
pub fn default_message(code: &str) -> &'static str {
    match code {
        "required" => "required",
        "filled" => "must be filled",
        "gteq" => "must be >= {n}",
        "gt" => "must be > {n}",
        "lteq" => "must be <= {n}",
        "lt" => "must be < {n}",
        "min_size" => "size cannot be less than {n}",
        "max_size" => "size cannot be greater than {n}",
        "format" => "is in invalid format",
        "included_in" => "must be one of: {n}",
        "type.string" => "must be a string",
        "type.integer" => "must be an integer",
        "type.float" => "must be a float",
        "type.bool" => "must be boolean",
        "type.date" => "must be a date",
        "type.date_time" => "must be a date time",
        "type.time" => "must be a time",
        "type.hash" => "must be a hash",
        "type.array" => "must be an array",
        _ => "is invalid",
    }
}

/// What a rule sees.
pub struct RuleContext<'a> {
    /// The coerced data produced by the schema pass.
    pub values: &'a ValueMap,
    /// The form being validated.
    pub form: &'a FormNode,
    /// The form's backing record.
    pub record: Option<&'a RecordRef>,
}

impl RuleContext<'_> {
    /// Returns a coerced value, or [`Value::Null`] when absent.
    pub fn value(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&NULL)
    }
}

type RuleCheck = Arc<dyn Fn(&RuleContext<'_>) -> Option<String> + Send + Sync>;

/// A custom check run after the schema. Returning `Some(message)` fails.
#[derive(Clone)]
pub struct Rule {
    key: Option<String>,
    check: RuleCheck,
}

impl Rule {
    /// A rule whose failure is reported on `key`.
    pub fn key<F>(key: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            key: Some(key.into()),
            check: Arc::new(check),
        }
    }

    /// A rule whose failure is a base error.
    pub fn base<F>(check: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            key: None,
            check: Arc::new(check),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("key", &self.key).finish_non_exhaustive()
    }
}

/// A contract driven by a [`Schema`] and a list of [`Rule`]s.
#[derive(Debug, Clone)]
pub struct SchemaContract {
    schema: Schema,
    rules: Vec<Rule>,
    messages: HashMap<String, String>,
}

impl SchemaContract {
    /// Creates a contract with no rules.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rules: Vec::new(),
            messages: HashMap::new(),
        }
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Overrides the message template for an error code. Takes precedence
    /// over [`Settings::messages`].
    #[must_use]
    pub fn message(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(code.into(), template.into());
        self
    }

    fn render(&self, settings: &Settings, code: &str, arg: Option<&str>) -> String {
        let template = self
            .messages
            .get(code)
            .or_else(|| settings.messages.get(code))
            .map_or_else(|| default_message(code), String::as_str);
        match arg {
            Some(n) => interpolate(template, &[("n", n)]),
            None => template.to_string(),
        }
    }
}

impl Contract for SchemaContract {
    fn schema(&self) -> Option<&Schema> {
        Some(&self.schema)
    }

    fn call(&self, values: &ValueMap, ctx: &ContractContext<'_>) -> ContractResult {
        let mut pass = Pass {
            contract: self,
            settings: ctx.form.settings(),
            messages: Vec::new(),
        };
        let data = pass.check_schema(&self.schema, values, &[]);
        let mut messages = pass.messages;

        let rule_ctx = RuleContext {
            values: &data,
            form: ctx.form,
            record: ctx.record,
        };
        for rule in &self.rules {
            match &rule.key {
                Some(key) => {
                    let has_error = messages
                        .iter()
                        .any(|m| matches!(m.path.first(), Some(ErrorKey::Field(f)) if f == key));
                    if has_error {
                        continue;
                    }
                    if let Some(text) = (rule.check)(&rule_ctx) {
                        messages.push(ContractMessage::at(vec![ErrorKey::field(key.clone())], text));
                    }
                }
                None => {
                    if let Some(text) = (rule.check)(&rule_ctx) {
                        messages.push(ContractMessage::base(text));
                    }
                }
            }
        }

        tracing::trace!(
            form = ctx.form.namespace(),
            messages = messages.len(),
            "schema contract called"
        );
        ContractResult::new(data, messages)
    }
}

/// One schema pass, collecting messages.
struct Pass<'c> {
    contract: &'c SchemaContract,
    settings: &'c Settings,
    messages: Vec<ContractMessage>,
}

impl Pass<'_> {
    fn fail(&mut self, path: &[ErrorKey], code: &str, arg: Option<&str>) {
        let text = self.contract.render(self.settings, code, arg);
        self.messages.push(ContractMessage::at(path.to_vec(), text));
    }

    fn check_schema(&mut self, schema: &Schema, values: &ValueMap, prefix: &[ErrorKey]) -> ValueMap {
        let mut data = ValueMap::new();
        for key in schema.keys() {
            let mut path = prefix.to_vec();
            path.push(ErrorKey::field(key.name.clone()));
            if let Some(value) = self.check_key(key, values.get(&key.name), &path) {
                data.insert(key.name.clone(), value);
            }
        }
        data
    }

    fn check_key(&mut self, key: &KeySchema, value: Option<&Value>, path: &[ErrorKey]) -> Option<Value> {
        let value = match value {
            None => {
                if key.required {
                    self.fail(path, "required", None);
                }
                return None;
            }
            Some(Value::Null) => {
                if key.nullable {
                    return Some(Value::Null);
                }
                let code = if key.required {
                    "required".to_string()
                } else if key.filled {
                    "filled".to_string()
                } else {
                    type_code(key.ty.value_type())
                };
                self.fail(path, &code, None);
                return None;
            }
            Some(value) => value,
        };

        if key.filled && value.is_blank() {
            self.fail(path, "filled", None);
            return None;
        }

        let (coerced, ok) = self.check_value(&key.ty, value, path);
        if !ok {
            return coerced;
        }
        let coerced = coerced?;
        if let Some(failed) = key.predicates.iter().find(|p| !p.check(&coerced)) {
            let arg = failed.argument();
            self.fail(path, failed.code(), Some(&arg));
            return None;
        }
        Some(coerced)
    }

    /// Coerces a non-null value. Returns the (possibly partial) coerced value
    /// and whether it passed without messages.
    fn check_value(&mut self, ty: &SchemaType, value: &Value, path: &[ErrorKey]) -> (Option<Value>, bool) {
        let before = self.messages.len();
        match ty {
            SchemaType::Hash(schema) => {
                let Value::Map(map) = value else {
                    self.fail(path, &type_code(ValueType::Hash), None);
                    return (None, false);
                };
                let data = self.check_schema(schema, map, path);
                (Some(Value::Map(data)), self.messages.len() == before)
            }
            SchemaType::Array(element) => {
                let Value::List(items) = value else {
                    self.fail(path, &type_code(ValueType::Array), None);
                    return (None, false);
                };
                let mut out = Vec::with_capacity(items.len());
                let mut complete = true;
                for (idx, item) in items.iter().enumerate() {
                    let mut item_path = path.to_vec();
                    item_path.push(ErrorKey::Index(idx));
                    match self.check_value(element, item, &item_path) {
                        (Some(v), _) => out.push(v),
                        (None, _) => complete = false,
                    }
                }
                (
                    complete.then_some(Value::List(out)),
                    self.messages.len() == before,
                )
            }
            SchemaType::Form(_) => {
                if matches!(value, Value::Map(_)) {
                    (Some(value.clone()), true)
                } else {
                    self.fail(path, &type_code(ValueType::Hash), None);
                    (None, false)
                }
            }
            scalar => match coerce_scalar(scalar.value_type(), value) {
                Ok(v) => (Some(v), true),
                Err(code) => {
                    self.fail(path, &code, None);
                    (None, false)
                }
            },
        }
    }
}
