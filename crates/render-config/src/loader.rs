//! Configuration Loader
//!
//! Handles loading the project manifest and applying environment overrides.

use crate::env::EnvironmentHints;
use crate::project::{ProjectConfig, ToolchainConfig};
use crate::{ConfigError, ConfigResult, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// Environment variable overriding the toolchain configuration list
pub const ENV_CONFIGS: &str = "RENDER_CONFIGS";
/// Environment variable forcing monolithic test builds
pub const ENV_MONOLITHIC: &str = "RENDER_TOOLCHAIN_MONOLITHIC";

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Project manifest (rendergen.toml) - lowest priority
/// 2. Environment variables (RENDER_*) - overrides the manifest
/// 3. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    lookup: Box<dyn Fn(&str) -> Option<String>>,
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Project manifest with environment overrides applied
    pub project: ProjectConfig,

    /// Include/library paths resolved from SDK variables
    pub hints: EnvironmentHints,

    /// Project root directory (where rendergen.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader reading the process environment
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Create a loader with a custom environment lookup
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find rendergen.toml.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;
        self.finish(project, project_root)
    }

    /// Load configuration from a specific manifest file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.finish(project, project_root)
    }

    fn finish(
        &self,
        project: ProjectConfig,
        project_root: Option<PathBuf>,
    ) -> ConfigResult<Config> {
        let project = self.apply_env_overrides(project)?;
        let hints = EnvironmentHints::resolve_with(&project.sdk, |name| (self.lookup)(name));

        Ok(Config {
            project,
            hints,
            project_root,
        })
    }

    /// Find the manifest by walking up the directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(MANIFEST_FILE);

            if config_path.exists() {
                log::debug!("Using manifest {}", config_path.display());
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to the manifest
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Some(configs) = (self.lookup)(ENV_CONFIGS) {
            let configs = parse_config_list(&configs);
            if configs.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_CONFIGS.to_string(),
                    reason: "no configuration names given".to_string(),
                });
            }
            config
                .toolchain
                .get_or_insert_with(ToolchainConfig::default)
                .configs = Some(configs);
        }

        if let Some(monolithic) = (self.lookup)(ENV_MONOLITHIC) {
            let monolithic = matches!(monolithic.to_lowercase().as_str(), "true" | "1" | "yes");
            config
                .toolchain
                .get_or_insert_with(ToolchainConfig::default)
                .monolithic = Some(monolithic);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a comma-separated configuration list
pub fn parse_config_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Get the project name
    pub fn project_name(&self) -> Option<&str> {
        self.project.project_name()
    }

    /// Check if a manifest was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Configured build configurations, if any
    pub fn configs(&self) -> Option<&[String]> {
        self.project
            .toolchain
            .as_ref()
            .and_then(|t| t.configs.as_deref())
    }

    /// Whether the toolchain forces a monolithic test build
    pub fn toolchain_monolithic(&self) -> bool {
        self.project
            .toolchain
            .as_ref()
            .and_then(|t| t.monolithic)
            .unwrap_or(false)
    }
}
