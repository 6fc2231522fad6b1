//! `nucleus-pkg check` command implementation.

use super::{parse_python_version, CommandContext};
use camino::Utf8Path;
use nucleus_config::CliOverrides;
use nucleus_core::descriptor::PackageDescriptor;
use nucleus_core::error::NucleusResult;
use nucleus_core::types::MarkerEnvironment;

/// Execute the `nucleus-pkg check` command.
///
/// Loads and parses the manifest without assembling or writing anything.
/// With `python`, each marker is evaluated for a Linux CPython of that version.
pub fn execute(
    config: Option<&Utf8Path>,
    overrides: &CliOverrides,
    python: Option<&str>,
    ctx: &CommandContext,
) -> NucleusResult<()> {
    let environment = python
        .map(parse_python_version)
        .transpose()?
        .map(MarkerEnvironment::linux_cpython);

    let config = ctx.load_config(config, overrides)?;
    ctx.output.step("🔍", &format!("Checking {}", config.manifest));

    let descriptor = PackageDescriptor::new(config.descriptor);
    let manifest = descriptor.load(config.manifest.as_std_path())?;
    let requirements = descriptor.parse(&manifest)?;

    let mut skipped = 0;
    for requirement in &requirements {
        match &environment {
            Some(env) if !requirement.applies_to(env) => {
                skipped += 1;
                ctx.output.info(&format!("  {} (skipped)", requirement));
            },
            _ => ctx.output.info(&format!("  {}", requirement)),
        }
    }

    match python {
        Some(version) => ctx.output.success(&format!(
            "{} dependencies, {} apply to Python {}",
            requirements.len(),
            requirements.len() - skipped,
            version
        )),
        None => ctx.output.success(&format!("{} dependencies", requirements.len())),
    }

    Ok(())
}
