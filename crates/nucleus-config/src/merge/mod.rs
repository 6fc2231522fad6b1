//! Configuration layering: built-in defaults < nucleus.toml < environment < CLI flags

use crate::toml::{load_from_file, NucleusToml};
use crate::{ConfigResult, CONFIG_FILE_NAME};
use camino::{Utf8Path, Utf8PathBuf};
use nucleus_core::descriptor::{DescriptorConfig, DEFAULT_MANIFEST};
use nucleus_core::error::NucleusError;
use nucleus_core::utils::resolve_from;
use std::collections::HashMap;
use tracing::debug;

/// Environment variables understood by the layering
pub const ENV_MANIFEST: &str = "NUCLEUS_MANIFEST";
pub const ENV_PACKAGE_VERSION: &str = "NUCLEUS_PACKAGE_VERSION";
pub const ENV_OUTPUT_DIR: &str = "NUCLEUS_OUTPUT_DIR";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Where the project configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No nucleus.toml; built-in values only
    Defaults,
    /// Project nucleus.toml file
    File(Utf8PathBuf),
}

/// Command-line flag overrides (highest priority)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub manifest: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub packages_root: Option<Utf8PathBuf>,
}

/// Fully resolved inputs for one build invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Absolute, normalized path to the requirements manifest
    pub manifest: Utf8PathBuf,
    /// Where the egg-info directory is written
    pub output_dir: Utf8PathBuf,
    /// Where import packages are discovered
    pub packages_root: Utf8PathBuf,
    /// Metadata constants for the descriptor
    pub descriptor: DescriptorConfig,
    pub source: ConfigSource,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Loader rooted at the process working directory
    pub fn from_current_dir() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| NucleusError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            NucleusError::config("cwd", format!("Working directory is not valid UTF-8: {}", e))
        })?;
        Ok(Self::new(cwd))
    }

    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Find nucleus.toml in the working directory or a parent
    pub fn find_config(&self) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Load the project configuration.
    ///
    /// An explicit path must exist. Without one, the directory tree is searched
    /// and a missing file just means built-in values.
    pub fn load_project_config(
        &self,
        explicit: Option<&Utf8Path>,
    ) -> ConfigResult<(Option<NucleusToml>, ConfigSource)> {
        let path = match explicit {
            Some(path) => Some(self.resolve(path)?),
            None => self.find_config(),
        };

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path);
                let config = load_from_file(&path)?;
                Ok((Some(config), ConfigSource::File(path)))
            },
            None => {
                debug!("No {} found, using built-in values", CONFIG_FILE_NAME);
                Ok((None, ConfigSource::Defaults))
            },
        }
    }

    /// Load and layer everything into a build configuration
    pub fn load(
        &self,
        explicit: Option<&Utf8Path>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &CliOverrides,
    ) -> ConfigResult<BuildConfig> {
        let (project_config, source) = self.load_project_config(explicit)?;
        ConfigLayering::merge_configs(&self.cwd, project_config, source, env_overrides, cli_overrides)
    }

    fn resolve(&self, path: &Utf8Path) -> ConfigResult<Utf8PathBuf> {
        resolve_utf8(&self.cwd, path)
    }
}

impl ConfigLayering {
    /// Merge multiple configuration layers.
    ///
    /// Paths from nucleus.toml are relative to the file's directory; paths from
    /// the environment and the command line are relative to `cwd`.
    pub fn merge_configs(
        cwd: &Utf8Path,
        project_config: Option<NucleusToml>,
        source: ConfigSource,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &CliOverrides,
    ) -> ConfigResult<BuildConfig> {
        let project_root = match &source {
            ConfigSource::File(path) => path.parent().unwrap_or(cwd).to_path_buf(),
            ConfigSource::Defaults => cwd.to_path_buf(),
        };

        let mut merged = BuildConfig {
            manifest: resolve_utf8(&project_root, Utf8Path::new(DEFAULT_MANIFEST))?,
            output_dir: project_root.clone(),
            packages_root: project_root.clone(),
            descriptor: DescriptorConfig::default(),
            source,
        };

        // Apply project file over the built-in values
        if let Some(project) = project_config {
            project.package.apply_to(&mut merged.descriptor)?;
            if let Some(manifest) = &project.manifest {
                merged.manifest = resolve_utf8(&project_root, manifest)?;
            }
            if let Some(output_dir) = &project.build.output_dir {
                merged.output_dir = resolve_utf8(&project_root, output_dir)?;
            }
            if let Some(packages_root) = &project.build.packages_root {
                merged.packages_root = resolve_utf8(&project_root, packages_root)?;
            }
        }

        Self::apply_env_overrides(&mut merged, cwd, env_overrides)?;

        // CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut merged, cwd, cli_overrides)?;

        Ok(merged)
    }

    /// Collect `NUCLEUS_*` variables from the process environment
    pub fn env_overrides_from_process() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("NUCLEUS_"))
            .collect()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut BuildConfig,
        cwd: &Utf8Path,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_MANIFEST => {
                    config.manifest = resolve_utf8(cwd, Utf8Path::new(value))?;
                },
                ENV_PACKAGE_VERSION => {
                    if value.trim().is_empty() {
                        return Err(NucleusError::config(ENV_PACKAGE_VERSION, "version must not be empty"));
                    }
                    config.descriptor.version = value.trim().to_string();
                },
                ENV_OUTPUT_DIR => {
                    config.output_dir = resolve_utf8(cwd, Utf8Path::new(value))?;
                },
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut BuildConfig,
        cwd: &Utf8Path,
        overrides: &CliOverrides,
    ) -> ConfigResult<()> {
        if let Some(manifest) = &overrides.manifest {
            config.manifest = resolve_utf8(cwd, manifest)?;
        }
        if let Some(output_dir) = &overrides.output_dir {
            config.output_dir = resolve_utf8(cwd, output_dir)?;
        }
        if let Some(packages_root) = &overrides.packages_root {
            config.packages_root = resolve_utf8(cwd, packages_root)?;
        }
        Ok(())
    }
}

fn resolve_utf8(base: &Utf8Path, path: &Utf8Path) -> ConfigResult<Utf8PathBuf> {
    let resolved = resolve_from(base.as_std_path(), path.as_std_path());
    Utf8PathBuf::try_from(resolved)
        .map_err(|e| NucleusError::config(path.as_str(), format!("Path is not valid UTF-8: {}", e)))
}
