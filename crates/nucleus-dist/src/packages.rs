//! Import package discovery.
//!
//! A directory is a package when it contains `__init__.py` and its name has
//! no `.`. Discovery only descends through packages, so a package nested
//! under a plain directory is not found. Names are dotted and sorted.

use nucleus_core::error::{NucleusError, NucleusResult};
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const PACKAGE_MARKER: &str = "__init__.py";

/// Find all import packages below `root`
pub fn find_packages(root: &Path) -> NucleusResult<Vec<String>> {
    let mut packages = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || is_package_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            NucleusError::io(format!("Failed to scan {} for packages", root.display()), e.into())
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(".");
        debug!("Found package {}", name);
        packages.push(name);
    }

    packages.sort();
    Ok(packages)
}

fn is_package_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && !entry.file_name().to_string_lossy().contains('.')
        && entry.path().join(PACKAGE_MARKER).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_find_packages() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "cortex_internal/__init__.py");
        touch(root, "cortex_internal/serve/__init__.py");
        touch(root, "cortex_internal/serve/server.py");
        touch(root, "cortex_internal/lib/__init__.py");
        // not packages
        touch(root, "scripts/run.py");
        touch(root, "scripts/inner/__init__.py");
        touch(root, "build.tmp/__init__.py");
        touch(root, "cortex_internal/__pycache__/mod.pyc");

        let packages = find_packages(root).unwrap();
        assert_eq!(
            packages,
            vec!["cortex_internal", "cortex_internal.lib", "cortex_internal.serve"]
        );
    }

    #[test]
    fn test_no_packages() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cortex_internal.requirements.txt");

        assert!(find_packages(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_packages(&dir.path().join("absent"));
        assert!(matches!(result, Err(NucleusError::Io { .. })));
    }
}
