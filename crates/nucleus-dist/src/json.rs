//! JSON rendering of the metadata record

use nucleus_core::error::{NucleusError, NucleusResult};
use nucleus_core::registrar::{Registrar, Registration};
use nucleus_core::types::PackageMetadata;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Write the record as pretty-printed JSON followed by a newline
pub fn write_json<W: Write>(mut writer: W, metadata: &PackageMetadata) -> NucleusResult<()> {
    serde_json::to_writer_pretty(&mut writer, metadata)
        .map_err(|e| NucleusError::registration("Failed to serialize package metadata".to_string(), e))?;
    writeln!(writer)
        .and_then(|_| writer.flush())
        .map_err(|e| NucleusError::registration("Failed to write package metadata".to_string(), e))
}

/// Emits the record as JSON, to a file or to stdout
#[derive(Debug, Clone, Default)]
pub struct JsonEmitter {
    path: Option<PathBuf>,
}

impl JsonEmitter {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn stdout() -> Self {
        Self { path: None }
    }
}

impl Registrar for JsonEmitter {
    fn name(&self) -> &str {
        "json"
    }

    fn register(&self, metadata: &PackageMetadata) -> NucleusResult<Registration> {
        match &self.path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    NucleusError::registration(format!("Failed to create {}", path.display()), e)
                })?;
                write_json(BufWriter::new(file), metadata)?;
                info!("Wrote {}", path.display());
                Ok(Registration::new(self.name()).with_artifact(path.clone()))
            },
            None => {
                write_json(io::stdout().lock(), metadata)?;
                Ok(Registration::new(self.name()))
            },
        }
    }
}
