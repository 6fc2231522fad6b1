//! Command implementations and dispatch logic.
//!
//! Every command resolves its inputs through [`CommandContext::load_config`],
//! so `nucleus.toml`, `NUCLEUS_*` variables and flags layer the same way
//! everywhere.

use camino::{Utf8Path, Utf8PathBuf};
use nucleus_config::{BuildConfig, CliOverrides, ConfigLayering, ConfigLoader};
use nucleus_core::error::{NucleusError, NucleusResult};
use std::collections::HashMap;
use tracing::info;

pub mod build;
pub mod check;
pub mod show;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub env: HashMap<String, String>,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Context for the running process
    pub fn new() -> NucleusResult<Self> {
        let loader = ConfigLoader::from_current_dir()?;

        Ok(Self {
            cwd: loader.cwd().to_path_buf(),
            env: ConfigLayering::env_overrides_from_process(),
            output: OutputHandler::new(),
        })
    }

    /// Resolve the layered build configuration for this invocation
    pub fn load_config(
        &self,
        config: Option<&Utf8Path>,
        overrides: &CliOverrides,
    ) -> NucleusResult<BuildConfig> {
        ConfigLoader::new(self.cwd.clone()).load(config, &self.env, overrides)
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> NucleusResult<()> {
    match command {
        Commands::Build {
            input,
            out_dir,
            packages_root,
            metadata_json,
        } => {
            info!("Building package metadata");
            let overrides = CliOverrides {
                manifest: input.manifest,
                output_dir: out_dir,
                packages_root,
            };
            build::execute(input.config.as_deref(), &overrides, metadata_json.as_deref(), ctx)
        },
        Commands::Check { input, python } => {
            info!("Checking requirements manifest");
            let overrides = CliOverrides {
                manifest: input.manifest,
                ..CliOverrides::default()
            };
            check::execute(input.config.as_deref(), &overrides, python.as_deref(), ctx)
        },
        Commands::Show { input, format } => {
            let overrides = CliOverrides {
                manifest: input.manifest,
                ..CliOverrides::default()
            };
            show::execute(input.config.as_deref(), &overrides, format, ctx)
        },
        Commands::Version => {
            show_version(ctx);
            Ok(())
        },
    }
}

fn show_version(ctx: &CommandContext) {
    let version = env!("CARGO_PKG_VERSION");
    let build_date = env!("BUILD_DATE");
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.info(&format!("nucleus-pkg v{}", version));
    ctx.output.info(&format!("Built: {}", build_date));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));
}

/// Validate a `--python` argument: two or three numeric components
pub fn parse_python_version(value: &str) -> NucleusResult<&str> {
    let parts: Vec<&str> = value.split('.').collect();
    let numeric = parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));

    if (2..=3).contains(&parts.len()) && numeric {
        Ok(value)
    } else {
        Err(NucleusError::config(
            "--python",
            format!("'{}' is not a Python version like 3.6 or 3.8.10", value),
        ))
    }
}
