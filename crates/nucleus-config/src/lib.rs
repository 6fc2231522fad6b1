//! Configuration for nucleus-pkg
//!
//! This crate handles parsing and validation of `nucleus.toml` and layers it
//! with the built-in descriptor constants, `NUCLEUS_*` environment variables
//! and command-line flags into one [`BuildConfig`].

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{BuildConfig, CliOverrides, ConfigLayering, ConfigLoader, ConfigSource};
pub use self::toml::{BuildSection, NucleusToml, PackageSection};

use nucleus_core::error::NucleusError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, NucleusError>;

/// File name searched for in the project directory and its parents
pub const CONFIG_FILE_NAME: &str = "nucleus.toml";
