//! # nestform-core
//!
//! Core types, settings, and error types for the nestform workspace.
//! This crate has no framework dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`value`] - The dynamic [`Value`] used for params, records, and coerced data
//! - [`utils`] - Text helpers for labels and messages
//! - [`settings`] - Form settings injected into form trees
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult};
pub use settings::Settings;
pub use value::{Value, ValueMap};
