//! Package metadata types.
//!
//! `PackageMetadata` is the complete description of the distributable package.
//! It is only built by [`crate::descriptor::PackageDescriptor::assemble`] and
//! exposes read-only accessors, so a record handed to a packaging tool is
//! exactly the record that was assembled.

use super::{Requirement, VersionSpecifiers};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Package metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) description: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) author_email: Option<String>,
    pub(crate) license: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) project_urls: IndexMap<String, String>,
    pub(crate) install_requires: Vec<Requirement>,
    pub(crate) setup_requires: Vec<Requirement>,
    pub(crate) python_requires: VersionSpecifiers,
    pub(crate) classifiers: IndexSet<String>,
    pub(crate) packages: Vec<String>,
}

impl PackageMetadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.author_email.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// Home page URL, verbatim
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Project links in declaration order
    pub fn project_urls(&self) -> &IndexMap<String, String> {
        &self.project_urls
    }

    /// Runtime dependencies in manifest order
    pub fn install_requires(&self) -> &[Requirement] {
        &self.install_requires
    }

    /// Build-time dependencies of the packaging step itself
    pub fn setup_requires(&self) -> &[Requirement] {
        &self.setup_requires
    }

    pub fn python_requires(&self) -> &VersionSpecifiers {
        &self.python_requires
    }

    pub fn classifiers(&self) -> &IndexSet<String> {
        &self.classifiers
    }

    /// Import packages shipped in the distribution (dotted names)
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Distribution name as used in file names (`nucleus-internal` -> `nucleus_internal`)
    pub fn safe_name(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
            .collect()
    }

    /// Check if this package declares a specific classifier
    pub fn has_classifier(&self, classifier: &str) -> bool {
        self.classifiers.contains(classifier)
    }

    /// Install requirements rendered the way the packaging tool receives them
    pub fn install_requires_strings(&self) -> Vec<String> {
        self.install_requires.iter().map(ToString::to_string).collect()
    }

    /// Top-level import packages, e.g. `nucleus` for `nucleus.serve`
    pub fn top_level(&self) -> Vec<&str> {
        let mut top: Vec<&str> = self
            .packages
            .iter()
            .filter(|package| !package.contains('.'))
            .map(String::as_str)
            .collect();
        top.sort_unstable();
        top
    }
}
