//! `nucleus-pkg show` command implementation.

use super::CommandContext;
use crate::ShowFormat;
use camino::Utf8Path;
use nucleus_config::CliOverrides;
use nucleus_core::descriptor::PackageDescriptor;
use nucleus_core::error::NucleusResult;
use nucleus_core::registrar::Registrar;
use nucleus_dist::{find_packages, render_pkg_info, JsonEmitter};

/// Execute the `nucleus-pkg show` command
pub fn execute(
    config: Option<&Utf8Path>,
    overrides: &CliOverrides,
    format: ShowFormat,
    ctx: &CommandContext,
) -> NucleusResult<()> {
    let config = ctx.load_config(config, overrides)?;

    let mut descriptor_config = config.descriptor;
    descriptor_config.packages = find_packages(config.packages_root.as_std_path())?;
    let metadata = PackageDescriptor::new(descriptor_config).build(config.manifest.as_std_path())?;

    match format {
        ShowFormat::Json => {
            JsonEmitter::stdout().register(&metadata)?;
        },
        ShowFormat::PkgInfo => ctx.output.data(&render_pkg_info(&metadata)),
    }

    Ok(())
}
