//! setuptools-style egg-info output.
//!
//! Layout of `<safe_name>.egg-info/`:
//! - `PKG-INFO`: core metadata, version 2.1
//! - `requires.txt`: unconditional requirements, then one `[:<marker>]`
//!   section per distinct marker (sections sorted by marker text)
//! - `top_level.txt`: top-level import packages
//! - `dependency_links.txt`: always empty

use nucleus_core::error::{NucleusError, NucleusResult};
use nucleus_core::registrar::{Registrar, Registration};
use nucleus_core::types::PackageMetadata;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const METADATA_VERSION: &str = "2.1";

/// Writes the egg-info directory for a package
#[derive(Debug, Clone)]
pub struct EggInfoWriter {
    output_dir: PathBuf,
}

impl EggInfoWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory that will hold the metadata files
    pub fn egg_info_dir(&self, metadata: &PackageMetadata) -> PathBuf {
        self.output_dir.join(format!("{}.egg-info", metadata.safe_name()))
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> NucleusResult<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, contents).map_err(|e| {
            NucleusError::registration(format!("Failed to write {}", path.display()), e)
        })?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl Registrar for EggInfoWriter {
    fn name(&self) -> &str {
        "egg-info"
    }

    fn register(&self, metadata: &PackageMetadata) -> NucleusResult<Registration> {
        let dir = self.egg_info_dir(metadata);
        fs::create_dir_all(&dir).map_err(|e| {
            NucleusError::registration(format!("Failed to create {}", dir.display()), e)
        })?;

        let mut top_level = metadata.top_level().join("\n");
        if !top_level.is_empty() {
            top_level.push('\n');
        }

        let registration = Registration::new(self.name())
            .with_artifact(Self::write_file(&dir, "PKG-INFO", &render_pkg_info(metadata))?)
            .with_artifact(Self::write_file(&dir, "requires.txt", &render_requires_txt(metadata))?)
            .with_artifact(Self::write_file(&dir, "top_level.txt", &top_level)?)
            .with_artifact(Self::write_file(&dir, "dependency_links.txt", "\n")?);

        info!("Wrote {}", dir.display());
        Ok(registration)
    }
}

/// Render the PKG-INFO core metadata file
pub fn render_pkg_info(metadata: &PackageMetadata) -> String {
    let mut out = String::new();
    let mut field = |key: &str, value: &str| {
        let _ = writeln!(out, "{}: {}", key, value);
    };

    field("Metadata-Version", METADATA_VERSION);
    field("Name", metadata.name());
    field("Version", metadata.version());
    if let Some(summary) = metadata.description() {
        field("Summary", summary);
    }
    if let Some(url) = metadata.url() {
        field("Home-page", url);
    }
    if let Some(author) = metadata.author() {
        field("Author", author);
    }
    if let Some(email) = metadata.author_email() {
        field("Author-email", email);
    }
    if let Some(license) = metadata.license() {
        field("License", license);
    }
    for (label, url) in metadata.project_urls() {
        field("Project-URL", &format!("{}, {}", label, url));
    }
    for classifier in metadata.classifiers() {
        field("Classifier", classifier);
    }
    if !metadata.python_requires().is_empty() {
        field("Requires-Python", &metadata.python_requires().to_string());
    }
    for requirement in metadata.install_requires() {
        field("Requires-Dist", &requirement.to_string());
    }

    out
}

/// Render requires.txt
pub fn render_requires_txt(metadata: &PackageMetadata) -> String {
    let mut out = String::new();
    let mut sections: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for requirement in metadata.install_requires() {
        match &requirement.marker {
            Some(marker) => sections
                .entry(marker.as_str())
                .or_default()
                .push(requirement.without_marker().to_string()),
            None => {
                let _ = writeln!(out, "{}", requirement);
            },
        }
    }

    for (marker, requirements) in sections {
        let _ = writeln!(out, "\n[:{}]", marker);
        for requirement in requirements {
            let _ = writeln!(out, "{}", requirement);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nucleus_core::descriptor::{DescriptorConfig, PackageDescriptor};
    use nucleus_core::manifest::parse_lines;

    fn metadata(lines: &[&str]) -> PackageMetadata {
        let mut config = DescriptorConfig::default();
        config.packages = vec!["cortex_internal".to_string(), "cortex_internal.lib".to_string()];
        let requirements = parse_lines(Path::new("requirements.txt"), lines).unwrap();
        PackageDescriptor::new(config).assemble(requirements)
    }

    #[test]
    fn test_pkg_info() {
        let text = render_pkg_info(&metadata(&["requests>=2.0", "numpy==1.21.0"]));
        let expected = "\
Metadata-Version: 2.1
Name: nucleus-internal
Version: 0.3.1
Summary: Internal package for the nucleus model server
Home-page: https:/github.com/cortexlabs/nucleus
Author: cortex.dev
Author-email: dev@cortex.dev
License: Apache License 2.0
Project-URL: Bug Reports, https://github.com/cortexlabs/nucleus/issues
Project-URL: Chat with us, https://community.cortex.dev/
Project-URL: Documentation, https://github.com/cortexlabs/nucleus
Project-URL: Source Code, https://github.com/cortexlabs/nucleus
Classifier: Operating System :: POSIX :: Linux
Classifier: Programming Language :: Python :: 3.6
Classifier: Intended Audience :: Developers
Requires-Python: >=3.6
Requires-Dist: requests>=2.0
Requires-Dist: numpy==1.21.0
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_requires_txt_groups_markers() {
        let text = render_requires_txt(&metadata(&[
            "requests>=2.0",
            r#"dataclasses; python_version < "3.7""#,
            "numpy==1.21.0",
            r#"uvloop>=0.14 ; sys_platform == "linux""#,
            r#"contextvars ; python_version < "3.7""#,
        ]));
        let expected = "\
requests>=2.0
numpy==1.21.0

[:python_version < \"3.7\"]
dataclasses
contextvars

[:sys_platform == \"linux\"]
uvloop>=0.14
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_register_writes_egg_info() {
        let dir = tempfile::tempdir().unwrap();
        let writer = EggInfoWriter::new(dir.path());
        let metadata = metadata(&["flask"]);

        let registration = writer.register(&metadata).unwrap();
        assert_eq!(registration.tool, "egg-info");
        assert_eq!(registration.artifacts.len(), 4);

        let egg_info = dir.path().join("nucleus_internal.egg-info");
        assert_eq!(writer.egg_info_dir(&metadata), egg_info);
        assert_eq!(fs::read_to_string(egg_info.join("requires.txt")).unwrap(), "flask\n");
        assert_eq!(fs::read_to_string(egg_info.join("top_level.txt")).unwrap(), "cortex_internal\n");
        assert!(fs::read_to_string(egg_info.join("PKG-INFO")).unwrap().starts_with("Metadata-Version: 2.1\n"));
    }

    #[test]
    fn test_register_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = EggInfoWriter::new(&blocker).register(&metadata(&[])).unwrap_err();
        assert!(matches!(err, NucleusError::Registration { .. }));
    }
}
