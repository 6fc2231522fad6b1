//! Interface to the external packaging tool.
//!
//! The descriptor only hands the finished record over; producing artifacts
//! and validating metadata shape (URL syntax, version format, name clashes)
//! is the implementor's job.

use crate::error::NucleusResult;
use crate::types::PackageMetadata;
use std::path::PathBuf;

/// Something that turns a metadata record into packaging artifacts
pub trait Registrar {
    /// Short tool name for logs
    fn name(&self) -> &str;

    /// Consume the record. Errors are passed back to the caller untouched.
    fn register(&self, metadata: &PackageMetadata) -> NucleusResult<Registration>;
}

/// What a registrar produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub tool: String,
    pub artifacts: Vec<PathBuf>,
}

impl Registration {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            artifacts: Vec::new(),
        }
    }

    /// Record a produced file
    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts.push(path.into());
        self
    }
}
