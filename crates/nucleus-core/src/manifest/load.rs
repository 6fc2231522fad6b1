//! Reading a requirements manifest from disk.

use crate::error::{NucleusError, NucleusResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw manifest contents, one entry per physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    path: PathBuf,
    lines: Vec<String>,
}

impl Manifest {
    /// Wrap lines that did not come from disk
    pub fn from_lines(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Read the manifest at `path`.
///
/// The file is closed before this returns, whether or not reading succeeded.
/// Missing, unreadable and non-UTF-8 files are all reported as
/// [`NucleusError::FileAccess`].
pub fn load_manifest(path: &Path) -> NucleusResult<Manifest> {
    let file = File::open(path).map_err(|e| NucleusError::file_access(path, e))?;

    let mut lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| NucleusError::file_access(path, e))?;

    if let Some(first) = lines.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    debug!("Read {} lines from {}", lines.len(), path.display());
    Ok(Manifest::from_lines(path, lines))
}
