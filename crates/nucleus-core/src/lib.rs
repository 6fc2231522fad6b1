//! # nucleus-core
//!
//! Builds the package description of `nucleus-internal` from a requirements
//! manifest.
//!
//! This crate provides:
//! - Requirement, VersionSpecifier and Marker types for manifest lines
//! - PackageMetadata, the immutable record handed to the packaging tool
//! - Manifest loading and fatal-on-first-error parsing
//! - PackageDescriptor, the load/parse/assemble/register pipeline
//! - NucleusError for unified error handling
//!
//! ## Architecture
//!
//! - `types`: Core data types
//! - `manifest`: Reading and parsing requirements files
//! - `descriptor`: Pipeline and built-in metadata constants
//! - `registrar`: Interface to the external packaging tool
//! - `error`: Error types and result aliases
//! - `utils`: Path helpers

pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod registrar;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use descriptor::{DescriptorConfig, PackageDescriptor};
pub use error::{NucleusError, NucleusResult};
pub use manifest::{load_manifest, parse_lines, parse_manifest, Manifest};
pub use registrar::{Registrar, Registration};
pub use types::{Marker, MarkerEnvironment, PackageMetadata, Requirement, VersionSpecifiers};
