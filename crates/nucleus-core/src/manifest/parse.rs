//! Turning manifest lines into requirements.
//!
//! Line handling follows the usual requirements-file conventions:
//! - blank lines are skipped
//! - `#` starts a comment at the start of a line or after whitespace
//!   (`pkg @ https://host/pkg.zip#egg=pkg` keeps its fragment)
//! - a trailing `\` joins the line with the next non-blank line, separated by
//!   a single space
//! - option lines (`-r`, `--index-url`, ...) are rejected

use super::Manifest;
use crate::error::{NucleusError, NucleusResult};
use crate::types::Requirement;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// A requirement line after comment stripping and continuation joining
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the physical line the logical line starts on
    pub number: usize,
    pub text: String,
}

/// Parse a loaded manifest
pub fn parse_manifest(manifest: &Manifest) -> NucleusResult<Vec<Requirement>> {
    parse_lines(manifest.path(), manifest.lines())
}

/// Parse raw manifest lines into requirements, in order.
///
/// The first malformed line aborts the whole parse; no partial list is
/// returned. `path` is only used for diagnostics.
pub fn parse_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> NucleusResult<Vec<Requirement>> {
    let mut requirements = Vec::new();
    let mut seen = HashSet::new();

    for line in logical_lines(path, lines)? {
        if line.text.starts_with('-') {
            return Err(NucleusError::parse(
                path,
                line.number,
                line.text,
                "option lines such as -r or --index-url are not supported in this manifest",
            ));
        }

        let requirement = Requirement::parse(&line.text)
            .map_err(|e| NucleusError::parse(path, line.number, line.text.as_str(), e))?;

        debug!("{}:{}: {}", path.display(), line.number, requirement);
        if !seen.insert(requirement.key()) {
            warn!(
                "{}:{}: '{}' is listed more than once",
                path.display(),
                line.number,
                requirement.name
            );
        }

        requirements.push(requirement);
    }

    Ok(requirements)
}

/// Strip comments, drop blank lines and join continuations
pub fn logical_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> NucleusResult<Vec<LogicalLine>> {
    let mut out = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (index, raw) in lines.iter().enumerate() {
        let number = index + 1;
        let text = strip_comment(raw.as_ref()).trim();
        if text.is_empty() {
            continue;
        }

        let (text, continues) = match text.strip_suffix('\\') {
            Some(head) => (head.trim_end(), true),
            None => (text, false),
        };

        let line = match pending.take() {
            Some(mut started) => {
                if !text.is_empty() {
                    started.text.push(' ');
                    started.text.push_str(text);
                }
                started
            },
            None => LogicalLine {
                number,
                text: text.to_string(),
            },
        };

        if continues {
            pending = Some(line);
        } else if !line.text.is_empty() {
            out.push(line);
        }
    }

    if let Some(dangling) = pending {
        return Err(NucleusError::parse(
            path,
            dangling.number,
            dangling.text,
            "line continuation '\\' at end of file",
        ));
    }

    Ok(out)
}

fn strip_comment(line: &str) -> &str {
    let mut previous_is_space = true;
    for (index, c) in line.char_indices() {
        if c == '#' && previous_is_space {
            return &line[..index];
        }
        previous_is_space = c.is_whitespace();
    }
    line
}
