//! Error types and result aliases for nucleus operations.
//!
//! Every failure in the descriptor pipeline is fatal. The variants carry enough
//! context (path, line number, offending text) for the CLI to point the user
//! at the missing or malformed input.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all nucleus operations
#[derive(Error, Debug)]
pub enum NucleusError {
    // Manifest errors
    #[error("Cannot read requirements manifest {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid requirement at {}:{line}: {content:?}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        content: String,
        reason: String,
    },

    // Config errors
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Packaging errors
    #[error("Packaging tool failed: {message}")]
    Registration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for nucleus operations
pub type NucleusResult<T> = Result<T, NucleusError>;

impl NucleusError {
    /// Create a manifest access error
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for one manifest line
    pub fn parse(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            content: content.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a config validation error
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a packaging error from any error type
    pub fn registration<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Registration {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Line number of the offending manifest line, if this is a parse error
    pub fn line(&self) -> Option<usize> {
        match self {
            NucleusError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            NucleusError::FileAccess { .. } => Some(
                "Check that the requirements manifest exists, or point to it with --manifest",
            ),
            NucleusError::Parse { .. } => Some(
                "Each line must look like `name[extras] <op>version[, ...] ; marker`, e.g. `requests>=2.0`",
            ),
            NucleusError::ConfigParse { .. } | NucleusError::ConfigValidation { .. } => {
                Some("Fix the value in nucleus.toml or the matching NUCLEUS_* variable")
            },
            _ => None,
        }
    }
}
