//! Core data types for the package descriptor.
//!
//! - Version specifiers (`>=2.0,<3`)
//! - Environment markers (`python_version >= "3.6"`)
//! - Requirements (one manifest line)
//! - The package metadata record

pub mod marker;
pub mod package;
pub mod requirement;
pub mod specifier;

// Re-export all public types
pub use marker::{Marker, MarkerEnvironment, MarkerError, MarkerExpr, MarkerOp, MarkerValue, MarkerVariable};
pub use package::PackageMetadata;
pub use requirement::{is_valid_name, Requirement, RequirementError};
pub use specifier::{Op, SpecifierError, VersionSpecifier, VersionSpecifiers};
