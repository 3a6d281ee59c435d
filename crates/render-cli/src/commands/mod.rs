pub mod configure;
pub mod plan;
pub mod platforms;

use anyhow::{Context, Result};
use log::debug;
use render_build::{Configurator, Platform};
use render_config::loader::parse_config_list;
use std::path::{Path, PathBuf};

/// Options shared by every command that plans a project
#[derive(Debug, Clone, Default)]
pub struct TargetOptions {
    /// Target platform (defaults to the host)
    pub target: Option<String>,
    /// Force a monolithic test bundle
    pub monolithic: bool,
    /// Comma-separated configuration list
    pub configs: Option<String>,
    /// Configure as part of a parent build
    pub nested: bool,
    /// Project directory (defaults to current directory)
    pub project_dir: Option<PathBuf>,
}

impl TargetOptions {
    /// Absolute project directory, so manifest discovery can walk up past it
    pub fn project_dir(&self) -> Result<PathBuf> {
        absolute_dir(self.project_dir.as_deref())
    }

    /// Load the manifest and apply command-line overrides
    pub fn configurator(&self) -> Result<Configurator> {
        let project_dir = self.project_dir()?;
        let mut configurator = Configurator::new(&project_dir).with_context(|| {
            format!("Failed to load project at {}", project_dir.display())
        })?;

        if let Some(target) = &self.target {
            let platform: Platform = target.parse()?;
            debug!("Target override: {}", platform);
            configurator = configurator.with_platform(platform);
        }
        if self.monolithic {
            debug!("Forcing monolithic test build");
            configurator = configurator.with_monolithic(true);
        }
        if let Some(configs) = &self.configs {
            let configs = parse_config_list(configs);
            if configs.is_empty() {
                anyhow::bail!("--configs needs at least one configuration name");
            }
            debug!("Configuration override: {}", configs.join(", "));
            configurator = configurator.with_configs(configs);
        }

        Ok(configurator.with_nested(self.nested))
    }
}

/// Resolve an optional directory argument against the working directory
pub fn absolute_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    Ok(match dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}
