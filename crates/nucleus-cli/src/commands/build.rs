//! `nucleus-pkg build` command implementation.
//!
//! Runs the whole pipeline and writes `<name>.egg-info` into the output
//! directory. The optional JSON copy is written first, so a failed JSON write
//! leaves no egg-info behind.

use super::CommandContext;
use camino::Utf8Path;
use nucleus_config::CliOverrides;
use nucleus_core::descriptor::PackageDescriptor;
use nucleus_core::error::NucleusResult;
use nucleus_core::registrar::{Registrar, Registration};
use nucleus_core::types::PackageMetadata;
use nucleus_dist::{find_packages, EggInfoWriter, JsonEmitter};

/// Everything `build` writes, in write order
struct BuildOutputs {
    json: Option<JsonEmitter>,
    egg_info: EggInfoWriter,
}

impl Registrar for BuildOutputs {
    fn name(&self) -> &str {
        self.egg_info.name()
    }

    fn register(&self, metadata: &PackageMetadata) -> NucleusResult<Registration> {
        let mut artifacts = Vec::new();
        if let Some(json) = &self.json {
            artifacts.extend(json.register(metadata)?.artifacts);
        }
        let mut registration = self.egg_info.register(metadata)?;
        registration.artifacts.splice(0..0, artifacts);
        Ok(registration)
    }
}

/// Execute the `nucleus-pkg build` command
pub fn execute(
    config: Option<&Utf8Path>,
    overrides: &CliOverrides,
    metadata_json: Option<&Utf8Path>,
    ctx: &CommandContext,
) -> NucleusResult<()> {
    let config = ctx.load_config(config, overrides)?;
    ctx.output.step(
        "📦",
        &format!("Building {} {}", config.descriptor.name, config.descriptor.version),
    );

    let mut descriptor_config = config.descriptor.clone();
    descriptor_config.packages = find_packages(config.packages_root.as_std_path())?;
    if descriptor_config.packages.is_empty() {
        ctx.output.warn(&format!("No import packages found under {}", config.packages_root));
    }

    let outputs = BuildOutputs {
        json: metadata_json.map(|path| JsonEmitter::to_file(ctx.cwd.join(path).into_std_path_buf())),
        egg_info: EggInfoWriter::new(config.output_dir.as_std_path()),
    };
    let descriptor = PackageDescriptor::new(descriptor_config);
    let (metadata, registration) = descriptor.build_and_register(config.manifest.as_std_path(), &outputs)?;

    ctx.output.success(&format!(
        "{} dependencies, {} packages",
        metadata.install_requires().len(),
        metadata.packages().len()
    ));
    ctx.output.info(&format!("Wrote {}", outputs.egg_info.egg_info_dir(&metadata).display()));
    for artifact in &registration.artifacts {
        ctx.output.info(&format!("  {}", artifact.display()));
    }

    Ok(())
}
