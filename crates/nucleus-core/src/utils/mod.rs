//! Utility functions and helpers.

pub mod path;

pub use path::{normalize_path, resolve_from};
