//! Packaging collaborators for the nucleus descriptor
//!
//! This crate turns an assembled `PackageMetadata` into something a Python
//! packaging tool consumes:
//! - `egg_info`: a setuptools-style `<name>.egg-info` directory
//! - `json`: the record as JSON
//! - `packages`: import package discovery for the record's package list

pub mod egg_info;
pub mod json;
pub mod packages;

// Re-export main types
pub use egg_info::{render_pkg_info, render_requires_txt, EggInfoWriter};
pub use json::{write_json, JsonEmitter};
pub use packages::find_packages;
