//! Small helpers shared by the nestform crates.

pub mod text;
