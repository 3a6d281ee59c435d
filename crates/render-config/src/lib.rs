//! Render build configuration
//!
//! Loads the declarative project manifest (`rendergen.toml`) that drives the
//! build planner, including:
//! - The render library module and its per-backend conditional sources
//! - Developer tool binaries
//! - Test cases and their per-platform resource sets
//! - Capability table overrides per platform
//! - SDK hints resolved from the environment
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Project manifest (./rendergen.toml, found by walking up)
//! 2. Environment variables (RENDER_*)
//! 3. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use render_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! ```

pub mod env;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the project manifest file
pub const MANIFEST_FILE: &str = "rendergen.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Missing required field '{field}' in {file}")]
    MissingField { field: String, file: PathBuf },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use env::{EnvironmentHints, SdkPaths};
pub use loader::{Config, ConfigLoader};
pub use project::{
    ConditionalConfig, LibraryConfig, PlatformOverride, ProjectConfig, ProjectSection,
    ResourceSetConfig, SdkConfig, TestsConfig, ToolConfig, ToolchainConfig,
};
