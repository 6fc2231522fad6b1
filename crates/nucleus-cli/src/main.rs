//! # nucleus-cli
//!
//! `nucleus-pkg` builds the package metadata of `nucleus-internal` from its
//! requirements manifest and writes it out for the Python packaging tool.
//!
//! This is the main entry point. It handles command parsing, sets up logging
//! and error reporting, and dispatches to the command handlers.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nucleus_core::error::NucleusResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Package descriptor builder for nucleus-internal
#[derive(Parser)]
#[command(name = "nucleus-pkg", version, about = "Build nucleus-internal package metadata")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the metadata and write the egg-info directory
    Build {
        #[command(flatten)]
        input: InputArgs,
        /// Directory the egg-info directory is written into
        #[arg(long, value_name = "DIR")]
        out_dir: Option<Utf8PathBuf>,
        /// Directory searched for import packages
        #[arg(long, value_name = "DIR")]
        packages_root: Option<Utf8PathBuf>,
        /// Also write the metadata record as JSON
        #[arg(long, value_name = "FILE")]
        metadata_json: Option<Utf8PathBuf>,
    },
    /// Parse the requirements manifest and list its dependencies
    Check {
        #[command(flatten)]
        input: InputArgs,
        /// Evaluate markers for this Python version (X.Y or X.Y.Z)
        #[arg(long, value_name = "VERSION")]
        python: Option<String>,
    },
    /// Print the assembled metadata record
    Show {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = ShowFormat::PkgInfo)]
        format: ShowFormat,
    },
    /// Show version information
    Version,
}

/// Where the configuration and manifest come from
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Path to nucleus.toml (searched upward when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Requirements manifest to read
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<Utf8PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    Json,
    PkgInfo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    debug!("Starting nucleus-pkg v{}", env!("CARGO_PKG_VERSION"));

    ExitCode::from(finish(run_cli(cli)))
}

/// Report a failed run on stderr and turn the outcome into the process exit status
fn finish(result: NucleusResult<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            1
        },
    }
}

fn run_cli(cli: Cli) -> NucleusResult<()> {
    let ctx = CommandContext::new()?;
    commands::dispatch_command(cli.command, &ctx)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nucleus_pkg={level},nucleus_core={level},nucleus_config={level},nucleus_dist={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
