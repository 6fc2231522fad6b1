//! nucleus.toml parsing and validation

use crate::ConfigResult;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use nucleus_core::descriptor::DescriptorConfig;
use nucleus_core::error::NucleusError;
use nucleus_core::types::{is_valid_name, Requirement, VersionSpecifiers};
use serde::{Deserialize, Serialize};

/// Complete nucleus.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NucleusToml {
    /// Requirements manifest, relative to the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Utf8PathBuf>,

    /// Package metadata overrides
    #[serde(default)]
    pub package: PackageSection,

    /// Build locations
    #[serde(default)]
    pub build: BuildSection,
}

/// Package metadata section. Unset fields keep the built-in values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Home page URL, passed through unvalidated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Minimum interpreter constraint, e.g. ">=3.6"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_requires: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_requires: Option<Vec<String>>,

    /// Label -> URL, in file order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_urls: Option<IndexMap<String, String>>,
}

/// Build section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSection {
    /// Directory the egg-info directory is written into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Directory searched for import packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_root: Option<Utf8PathBuf>,
}

impl PackageSection {
    /// Overlay the set fields onto `config`
    pub fn apply_to(&self, config: &mut DescriptorConfig) -> ConfigResult<()> {
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(version) = &self.version {
            config.version = version.clone();
        }
        if let Some(description) = &self.description {
            config.description = Some(description.clone());
        }
        if let Some(author) = &self.author {
            config.author = Some(author.clone());
        }
        if let Some(author_email) = &self.author_email {
            config.author_email = Some(author_email.clone());
        }
        if let Some(license) = &self.license {
            config.license = Some(license.clone());
        }
        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }
        if let Some(python_requires) = &self.python_requires {
            config.python_requires = parse_python_requires(python_requires)?;
        }
        if let Some(classifiers) = &self.classifiers {
            config.classifiers = classifiers.iter().cloned().collect();
        }
        if let Some(setup_requires) = &self.setup_requires {
            config.setup_requires = setup_requires
                .iter()
                .map(|line| parse_setup_requirement(line))
                .collect::<ConfigResult<_>>()?;
        }
        if let Some(project_urls) = &self.project_urls {
            config.project_urls = project_urls.clone();
        }
        Ok(())
    }
}

/// Parse TOML string to NucleusToml configuration
pub fn parse_nucleus_toml(content: &str, path: &Utf8Path) -> ConfigResult<NucleusToml> {
    // First try with toml_edit for better error reporting
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| NucleusError::ConfigParse {
            path: path.as_std_path().to_path_buf(),
            message: format!("TOML syntax error: {}", e),
        })?;

    // Then parse with serde for type safety
    let config: NucleusToml = ::toml::from_str(content).map_err(|e| NucleusError::ConfigParse {
        path: path.as_std_path().to_path_buf(),
        message: e.message().to_string(),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration completeness
pub fn validate_config(config: &NucleusToml) -> ConfigResult<()> {
    let package = &config.package;

    if let Some(name) = &package.name {
        if !is_valid_name(name) {
            return Err(NucleusError::config(
                "package.name",
                format!(
                    "'{}' is not a valid distribution name (letters, digits, '-', '_' and '.', starting and ending with a letter or digit)",
                    name
                ),
            ));
        }
    }

    if let Some(version) = &package.version {
        if version.trim().is_empty() {
            return Err(NucleusError::config("package.version", "version must not be empty"));
        }
    }

    if let Some(python_requires) = &package.python_requires {
        parse_python_requires(python_requires)?;
    }

    if let Some(setup_requires) = &package.setup_requires {
        for line in setup_requires {
            parse_setup_requirement(line)?;
        }
    }

    if let Some(classifiers) = &package.classifiers {
        if classifiers.iter().any(|c| c.trim().is_empty()) {
            return Err(NucleusError::config("package.classifiers", "classifiers must not be empty"));
        }
    }

    if let Some(manifest) = &config.manifest {
        if manifest.as_str().is_empty() {
            return Err(NucleusError::config("manifest", "manifest path must not be empty"));
        }
    }

    Ok(())
}

/// Load and parse nucleus.toml from file path
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<NucleusToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| NucleusError::io(format!("Failed to read {}", path), e))?;

    parse_nucleus_toml(&content, path)
}

fn parse_python_requires(value: &str) -> ConfigResult<VersionSpecifiers> {
    VersionSpecifiers::parse(value)
        .map_err(|e| NucleusError::config("package.python-requires", format!("'{}': {}", value, e)))
}

fn parse_setup_requirement(line: &str) -> ConfigResult<Requirement> {
    Requirement::parse(line)
        .map_err(|e| NucleusError::config("package.setup-requires", format!("'{}': {}", line, e)))
}
