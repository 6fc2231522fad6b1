//! The package descriptor pipeline.
//!
//! `load -> parse -> assemble -> register`, run once per invocation. Every
//! input (manifest path, metadata constants, discovered packages) is injected
//! through [`DescriptorConfig`] and the call arguments; nothing here reads the
//! environment or the working directory.

use crate::error::NucleusResult;
use crate::manifest::{self, Manifest};
use crate::registrar::{Registrar, Registration};
use crate::types::{Op, PackageMetadata, Requirement, VersionSpecifier, VersionSpecifiers};
use indexmap::{IndexMap, IndexSet};
use std::path::Path;
use tracing::info;

pub const DEFAULT_NAME: &str = "nucleus-internal";
pub const DEFAULT_VERSION: &str = "0.3.1";
pub const DEFAULT_DESCRIPTION: &str = "Internal package for the nucleus model server";
pub const DEFAULT_AUTHOR: &str = "cortex.dev";
pub const DEFAULT_AUTHOR_EMAIL: &str = "dev@cortex.dev";
pub const DEFAULT_LICENSE: &str = "Apache License 2.0";
pub const DEFAULT_URL: &str = "https:/github.com/cortexlabs/nucleus";
pub const DEFAULT_MANIFEST: &str = "cortex_internal.requirements.txt";
pub const DEFAULT_SETUP_REQUIRES: &[&str] = &["setuptools", "wheel"];
pub const DEFAULT_CLASSIFIERS: &[&str] = &[
    "Operating System :: POSIX :: Linux",
    "Programming Language :: Python :: 3.6",
    "Intended Audience :: Developers",
];
pub const DEFAULT_PROJECT_URLS: &[(&str, &str)] = &[
    ("Bug Reports", "https://github.com/cortexlabs/nucleus/issues"),
    ("Chat with us", "https://community.cortex.dev/"),
    ("Documentation", "https://github.com/cortexlabs/nucleus"),
    ("Source Code", "https://github.com/cortexlabs/nucleus"),
];

/// Everything except the dependency list that goes into the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorConfig {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub url: Option<String>,
    pub project_urls: IndexMap<String, String>,
    pub python_requires: VersionSpecifiers,
    pub setup_requires: Vec<Requirement>,
    pub classifiers: IndexSet<String>,
    pub packages: Vec<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            description: Some(DEFAULT_DESCRIPTION.to_string()),
            author: Some(DEFAULT_AUTHOR.to_string()),
            author_email: Some(DEFAULT_AUTHOR_EMAIL.to_string()),
            license: Some(DEFAULT_LICENSE.to_string()),
            url: Some(DEFAULT_URL.to_string()),
            project_urls: DEFAULT_PROJECT_URLS
                .iter()
                .map(|(label, url)| (label.to_string(), url.to_string()))
                .collect(),
            python_requires: VersionSpecifiers::from(vec![VersionSpecifier::new(
                Op::GreaterEq,
                "3.6",
            )]),
            setup_requires: DEFAULT_SETUP_REQUIRES.iter().map(|name| Requirement::new(*name)).collect(),
            classifiers: DEFAULT_CLASSIFIERS.iter().map(|c| c.to_string()).collect(),
            packages: Vec::new(),
        }
    }
}

/// Builds the package metadata record from a manifest
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    config: DescriptorConfig,
}

impl PackageDescriptor {
    pub fn new(config: DescriptorConfig) -> Self {
        Self { config }
    }

    /// Read the manifest; fails with `FileAccess` if it is missing
    pub fn load(&self, manifest_path: &Path) -> NucleusResult<Manifest> {
        manifest::load_manifest(manifest_path)
    }

    /// Parse every manifest line; the first bad line fails the whole parse
    pub fn parse(&self, manifest: &Manifest) -> NucleusResult<Vec<Requirement>> {
        manifest::parse_manifest(manifest)
    }

    /// Combine parsed requirements with the configured constants
    pub fn assemble(&self, install_requires: Vec<Requirement>) -> PackageMetadata {
        let config = self.config.clone();
        PackageMetadata {
            name: config.name,
            version: config.version,
            description: config.description,
            author: config.author,
            author_email: config.author_email,
            license: config.license,
            url: config.url,
            project_urls: config.project_urls,
            install_requires,
            setup_requires: config.setup_requires,
            python_requires: config.python_requires,
            classifiers: config.classifiers,
            packages: config.packages,
        }
    }

    /// Load, parse and assemble. No record exists unless every step succeeded.
    pub fn build(&self, manifest_path: &Path) -> NucleusResult<PackageMetadata> {
        info!("Loading requirements manifest {}", manifest_path.display());
        let manifest = self.load(manifest_path)?;

        let install_requires = self.parse(&manifest)?;
        info!("Parsed {} requirements", install_requires.len());

        let metadata = self.assemble(install_requires);
        info!("Assembled metadata for {} {}", metadata.name(), metadata.version());
        Ok(metadata)
    }

    /// Run the whole pipeline and hand the record to the packaging tool
    pub fn build_and_register(
        &self,
        manifest_path: &Path,
        registrar: &dyn Registrar,
    ) -> NucleusResult<(PackageMetadata, Registration)> {
        let metadata = self.build(manifest_path)?;

        info!("Registering {} with {}", metadata.name(), registrar.name());
        let registration = registrar.register(&metadata)?;
        Ok((metadata, registration))
    }
}
