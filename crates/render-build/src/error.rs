/// Build planning error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("Artifact '{name}' is already declared")]
    DuplicateArtifact { name: String },

    #[error("Artifact '{dependency}' (required by {dependent}) is never declared")]
    MissingDependency { dependent: String, dependency: String },

    #[error("Library '{library}' cannot depend on {kind} '{dependency}'")]
    InvalidDependency {
        library: String,
        dependency: String,
        kind: String,
    },

    #[error("Invalid artifact '{name}': {reason}")]
    InvalidArtifact { name: String, reason: String },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Configuration error: {0}")]
    Config(#[from] render_config::ConfigError),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create an artifact validation error
    pub fn invalid_artifact(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidArtifact {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing dependency error
    pub fn missing_dependency(dependent: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            dependent: dependent.into(),
            dependency: dependency.into(),
        }
    }
}
