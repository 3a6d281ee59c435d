//! Environment-derived hints
//!
//! SDK roots such as `VULKAN_SDK` contribute an include path and a library
//! path when set. An unset variable contributes nothing and is not an error.

use crate::project::SdkConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default SDK hints when the manifest declares none
pub const DEFAULT_SDK_NAME: &str = "vulkan";
pub const DEFAULT_SDK_VARIABLE: &str = "VULKAN_SDK";

/// Paths contributed by one resolved SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkPaths {
    pub name: String,
    pub root: PathBuf,
    pub include: PathBuf,
    pub lib: PathBuf,
}

/// Include and library search paths resolved from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentHints {
    sdks: Vec<SdkPaths>,
}

impl EnvironmentHints {
    /// Resolve hints against the process environment
    pub fn from_env(sdks: &BTreeMap<String, SdkConfig>) -> Self {
        Self::resolve_with(sdks, |name| std::env::var(name).ok())
    }

    /// Resolve hints with a custom variable lookup
    pub fn resolve_with<F>(sdks: &BTreeMap<String, SdkConfig>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults;
        let sdks = if sdks.is_empty() {
            defaults = default_sdks();
            &defaults
        } else {
            sdks
        };

        let mut resolved = Vec::new();
        for (name, sdk) in sdks {
            match lookup(&sdk.variable).filter(|value| !value.trim().is_empty()) {
                Some(root) => {
                    let root = PathBuf::from(root);
                    let include = root.join(sdk.include.as_deref().unwrap_or(Path::new("include")));
                    let lib = root.join(sdk.lib.as_deref().unwrap_or(Path::new("lib")));
                    log::debug!("SDK '{}' found at {}", name, root.display());
                    resolved.push(SdkPaths {
                        name: name.clone(),
                        root,
                        include,
                        lib,
                    });
                }
                None => {
                    log::debug!("SDK '{}' not set (${}), skipping", name, sdk.variable);
                }
            }
        }

        Self { sdks: resolved }
    }

    /// SDKs that were found
    pub fn sdks(&self) -> &[SdkPaths] {
        &self.sdks
    }

    /// Include paths contributed by all found SDKs
    pub fn include_paths(&self) -> Vec<PathBuf> {
        self.sdks.iter().map(|s| s.include.clone()).collect()
    }

    /// Library paths contributed by all found SDKs
    pub fn lib_paths(&self) -> Vec<PathBuf> {
        self.sdks.iter().map(|s| s.lib.clone()).collect()
    }
}

fn default_sdks() -> BTreeMap<String, SdkConfig> {
    let mut sdks = BTreeMap::new();
    sdks.insert(
        DEFAULT_SDK_NAME.to_string(),
        SdkConfig {
            variable: DEFAULT_SDK_VARIABLE.to_string(),
            include: None,
            lib: None,
        },
    );
    sdks
}
