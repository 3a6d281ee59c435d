//! Toolchain configuration sets
//!
//! Enumerates the build configurations (debug, release, profile, deploy or
//! custom) a run generates rules for, and the subset developer tools are
//! built in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfig {
    Debug,
    Release,
    Profile,
    Deploy,
    Custom(String),
}

impl BuildConfig {
    /// Parse a configuration name
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "debug" => Self::Debug,
            "release" => Self::Release,
            "profile" => Self::Profile,
            "deploy" => Self::Deploy,
            custom => Self::Custom(custom.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Profile => "profile",
            Self::Deploy => "deploy",
            Self::Custom(name) => name,
        }
    }

    /// Check if this is a built-in configuration
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Standalone tools are never shipped in profiling or deployment builds
    pub fn ships_tools(&self) -> bool {
        !matches!(self, Self::Profile | Self::Deploy)
    }

    /// The default configuration list
    pub fn defaults() -> Vec<BuildConfig> {
        vec![Self::Debug, Self::Release, Self::Profile, Self::Deploy]
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered, de-duplicated set of configurations for one run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolchainConfigSet {
    configs: Vec<BuildConfig>,
}

impl ToolchainConfigSet {
    /// Create a set; later duplicates are dropped
    pub fn new(configs: impl IntoIterator<Item = BuildConfig>) -> Self {
        let mut set = Self::default();
        for config in configs {
            if !set.configs.contains(&config) {
                set.configs.push(config);
            }
        }
        set
    }

    /// Create a set from configuration names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(names.iter().map(|n| BuildConfig::parse(n.as_ref())))
    }

    /// All configurations
    pub fn available_configs(&self) -> &[BuildConfig] {
        &self.configs
    }

    /// Configurations tool binaries are built in
    ///
    /// An empty result means no tool binaries are planned; that is not an error.
    pub fn tool_configs(&self) -> Vec<BuildConfig> {
        self.configs
            .iter()
            .filter(|c| c.ships_tools())
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.configs.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_parse() {
        assert_eq!(BuildConfig::parse("debug"), BuildConfig::Debug);
        assert_eq!(BuildConfig::parse("Release"), BuildConfig::Release);
        assert_eq!(BuildConfig::parse("profile"), BuildConfig::Profile);
        assert_eq!(BuildConfig::parse("deploy"), BuildConfig::Deploy);
        assert_eq!(
            BuildConfig::parse("asan"),
            BuildConfig::Custom("asan".to_string())
        );
    }

    #[test]
    fn test_build_config_is_builtin() {
        assert!(BuildConfig::Debug.is_builtin());
        assert!(BuildConfig::Deploy.is_builtin());
        assert!(!BuildConfig::Custom("asan".to_string()).is_builtin());
    }

    #[test]
    fn test_tool_configs_exclude_reserved() {
        let set = ToolchainConfigSet::new(BuildConfig::defaults());
        assert_eq!(set.available_configs().len(), 4);
        assert_eq!(
            set.tool_configs(),
            vec![BuildConfig::Debug, BuildConfig::Release]
        );
    }

    #[test]
    fn test_tool_configs_keep_custom() {
        let set = ToolchainConfigSet::from_names(&["asan", "profile"]);
        assert_eq!(
            set.tool_configs(),
            vec![BuildConfig::Custom("asan".to_string())]
        );
    }

    #[test]
    fn test_only_reserved_configs_yield_no_tools() {
        let set = ToolchainConfigSet::from_names(&["profile", "deploy"]);
        assert!(!set.is_empty());
        assert!(set.tool_configs().is_empty());
    }

    #[test]
    fn test_empty_set() {
        let set = ToolchainConfigSet::default();
        assert!(set.is_empty());
        assert!(set.tool_configs().is_empty());
    }

    #[test]
    fn test_duplicates_dropped_in_order() {
        let set = ToolchainConfigSet::from_names(&["release", "debug", "release"]);
        assert_eq!(set.names(), vec!["release", "debug"]);
    }
}
