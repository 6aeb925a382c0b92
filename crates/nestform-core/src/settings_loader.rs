//! Loading [`Settings`] from TOML or JSON, with environment overrides.
//!
//! A file only needs the keys it changes; everything else keeps its
//! default. Environment variables are applied last:
//!
//! | Env Var | Setting |
//! |---|---|
//! | `NESTFORM_STRICT_PARAM_KEYS` | `strict_param_keys` |
//! | `NESTFORM_ALLOW_QUERY_PARAMS` | `allow_query_params` |
//! | `NESTFORM_DEBUG` | `debug` |
//! | `NESTFORM_LOG_LEVEL` | `log_level` |
//!
//! ```rust,no_run
//! use nestform_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/forms.toml").unwrap();
//! ```

use std::path::Path;

use serde_json::Value as Json;

use crate::error::FormError;
use crate::settings::Settings;

/// Parses TOML settings.
pub fn from_toml_str(source: &str) -> Result<Settings, FormError> {
    let table: toml::Table = toml::from_str(source)
        .map_err(|e| FormError::ConfigurationError(format!("invalid TOML settings: {e}")))?;
    let json = serde_json::to_value(table)
        .map_err(|e| FormError::ConfigurationError(format!("unsupported TOML value: {e}")))?;
    merge_over_defaults(json)
}

/// Reads and parses a TOML settings file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    from_toml_str(&read(path.as_ref())?)
}

/// Reads a TOML settings file, then applies environment overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Parses JSON settings.
pub fn from_json_str(source: &str) -> Result<Settings, FormError> {
    let json: Json = serde_json::from_str(source)
        .map_err(|e| FormError::ConfigurationError(format!("invalid JSON settings: {e}")))?;
    merge_over_defaults(json)
}

/// Reads and parses a JSON settings file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    from_json_str(&read(path.as_ref())?)
}

/// Default settings with environment overrides applied.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Overrides fields from `NESTFORM_*` variables.
///
/// Flags are on for `true`, `1`, `yes` or `on` in any case, off otherwise.
pub fn apply_env_overrides(settings: &mut Settings) {
    let flag = |name: &str| {
        std::env::var(name)
            .ok()
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    };

    if let Some(on) = flag("NESTFORM_STRICT_PARAM_KEYS") {
        settings.strict_param_keys = on;
    }
    if let Some(on) = flag("NESTFORM_ALLOW_QUERY_PARAMS") {
        settings.allow_query_params = on;
    }
    if let Some(on) = flag("NESTFORM_DEBUG") {
        settings.debug = on;
    }
    if let Ok(level) = std::env::var("NESTFORM_LOG_LEVEL") {
        settings.log_level = level;
    }
    tracing::trace!(?settings, "environment overrides applied");
}

fn read(path: &Path) -> Result<String, FormError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormError::ConfigurationError(format!("cannot read settings file {}: {e}", path.display()))
    })
}

fn merge_over_defaults(overrides: Json) -> Result<Settings, FormError> {
    let mut merged = serde_json::to_value(Settings::default())
        .map_err(|e| FormError::ConfigurationError(e.to_string()))?;
    merge(&mut merged, overrides);
    serde_json::from_value(merged)
        .map_err(|e| FormError::ConfigurationError(format!("invalid settings: {e}")))
}

/// Objects merge key by key; anything else replaces.
fn merge(target: &mut Json, overrides: Json) {
    match (target, overrides) {
        (Json::Object(target), Json::Object(overrides)) => {
            for (key, value) in overrides {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, overrides) => *target = overrides,
    }
}
