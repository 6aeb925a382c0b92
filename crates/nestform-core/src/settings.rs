//! Settings consumed by form trees.
//!
//! [`Settings`] is an explicit value: a form node receives it at
//! construction and hands it down to every nested node it creates. There is
//! no process-wide settings instance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The complete set of nestform settings.
///
/// # Examples
///
/// ```
/// use nestform_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.strict_param_keys);
/// assert!(!settings.allow_query_params);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Params ───────────────────────────────────────────────────────

    /// Reject assignment of keys that are not fields of the form.
    pub strict_param_keys: bool,
    /// Accept a raw `QueryDict` as form params and unwrap it into a plain map.
    pub allow_query_params: bool,

    // ── Messages ─────────────────────────────────────────────────────

    /// Message template overrides keyed by error code (e.g. `"required"`).
    pub messages: HashMap<String, String>,

    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict_param_keys: true,
            allow_query_params: false,
            messages: HashMap::new(),
            debug: true,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns settings with lenient params handling: unknown keys are dropped.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict_param_keys: false,
            ..Self::default()
        }
    }

    /// Sets the strict param keys flag.
    #[must_use]
    pub const fn with_strict_param_keys(mut self, strict: bool) -> Self {
        self.strict_param_keys = strict;
        self
    }

    /// Sets the query params flag.
    #[must_use]
    pub const fn with_allow_query_params(mut self, allow: bool) -> Self {
        self.allow_query_params = allow;
        self
    }

    /// Adds a message template override.
    #[must_use]
    pub fn with_message(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(code.into(), template.into());
        self
    }
}
