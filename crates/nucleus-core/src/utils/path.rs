//! Path utilities.
//!
//! Configuration values name files relative to the directory of the config
//! file; these helpers turn them into concrete paths without touching the
//! filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip current directory
            },
            Component::ParentDir => {
                // Only pop a normal component; leading .. must be kept
                match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    },
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {},
                    _ => components.push(component),
                }
            },
            other => {
                components.push(other);
            },
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}
