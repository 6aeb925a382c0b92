//! # nestform-http
//!
//! Request parameter handling for nestform.
//!
//! - [`QueryDict`]: flat, multi-valued parameters as they arrive in a query
//!   string or an `application/x-www-form-urlencoded` body.
//! - [`nested`]: expansion of bracket-notation keys such as
//!   `user[bookmarks][0][url]` into nested value maps.

pub mod nested;
pub mod querydict;

pub use querydict::QueryDict;
