//! Module specifications
//!
//! A module is a named unit of sources compiled into one artifact. Sources may
//! be conditional on the target platform or on a backend being available
//! there; conditions are evaluated once per target by the assembler.

use crate::capability::{Backend, PlatformCapabilities};
use crate::error::BuildResult;
use crate::target::{Platform, Target};
use render_config::{ConditionalConfig, LibraryConfig, ToolConfig};
use std::path::{Path, PathBuf};

/// Predicate guarding a group of conditional sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// True when the target is one of these platforms
    Platforms(Vec<Platform>),
    /// True when the target platform compiles this backend
    Backend(Backend),
}

impl Condition {
    pub fn matches(&self, target: &Target, capabilities: &PlatformCapabilities) -> bool {
        match self {
            Self::Platforms(platforms) => platforms.contains(&target.platform()),
            Self::Backend(backend) => capabilities.supports_backend(*backend),
        }
    }

    fn from_config(config: &ConditionalConfig) -> BuildResult<Self> {
        match (&config.platforms, &config.backend) {
            (Some(platforms), _) => Ok(Self::Platforms(
                platforms
                    .iter()
                    .map(|p| p.parse())
                    .collect::<BuildResult<Vec<_>>>()?,
            )),
            (None, Some(backend)) => Ok(Self::Backend(backend.parse()?)),
            // render_config validation rejects entries without a predicate
            (None, None) => Ok(Self::Platforms(Vec::new())),
        }
    }
}

/// Sources included when a condition holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalSources {
    pub condition: Condition,
    pub sources: Vec<PathBuf>,
}

/// Declarative description of one compiled unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: String,
    /// Directory sources are relative to
    pub basepath: PathBuf,
    pub base_sources: Vec<PathBuf>,
    pub conditional_sources: Vec<ConditionalSources>,
    pub libs: Vec<String>,
    pub frameworks: Vec<String>,
    /// Libraries linked but not built by this project
    pub dependlibs: Vec<String>,
    pub include_paths: Vec<PathBuf>,
    pub lib_paths: Vec<PathBuf>,
}

impl ModuleSpec {
    /// Create a module with sources relative to `basepath`
    pub fn new(name: impl Into<String>, basepath: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            basepath: basepath.into(),
            base_sources: Vec::new(),
            conditional_sources: Vec::new(),
            libs: Vec::new(),
            frameworks: Vec::new(),
            dependlibs: Vec::new(),
            include_paths: Vec::new(),
            lib_paths: Vec::new(),
        }
    }

    pub fn with_sources<P: Into<PathBuf>>(mut self, sources: impl IntoIterator<Item = P>) -> Self {
        self.base_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Add a group of sources guarded by `condition`
    pub fn with_conditional<P: Into<PathBuf>>(
        mut self,
        condition: Condition,
        sources: impl IntoIterator<Item = P>,
    ) -> Self {
        self.conditional_sources.push(ConditionalSources {
            condition,
            sources: sources.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_libs(mut self, libs: Vec<String>) -> Self {
        self.libs = libs;
        self
    }

    pub fn with_frameworks(mut self, frameworks: Vec<String>) -> Self {
        self.frameworks = frameworks;
        self
    }

    pub fn with_dependlibs(mut self, dependlibs: Vec<String>) -> Self {
        self.dependlibs = dependlibs;
        self
    }

    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths;
        self
    }

    /// Join a module-relative path under the basepath
    pub fn source_path(&self, source: &Path) -> PathBuf {
        self.basepath.join(source)
    }

    /// Build the library module from its manifest section
    pub fn from_library_config(
        name: &str,
        config: &LibraryConfig,
        dependlibs: &[String],
    ) -> BuildResult<Self> {
        let basepath = config
            .basepath
            .clone()
            .unwrap_or_else(|| PathBuf::from(name));

        let mut module = Self::new(name, basepath)
            .with_sources(config.sources.iter().cloned())
            .with_dependlibs(dependlibs.to_vec())
            .with_include_paths(config.includepaths.clone());

        for conditional in &config.conditional {
            module = module.with_conditional(
                Condition::from_config(conditional)?,
                conditional.sources.iter().cloned(),
            );
        }

        Ok(module)
    }

    /// Build a tool module from its manifest entry
    pub fn from_tool_config(config: &ToolConfig) -> Self {
        let basepath = config
            .basepath
            .clone()
            .unwrap_or_else(|| Path::new("tools").join(&config.name));

        Self::new(config.name.as_str(), basepath)
            .with_sources(config.sources.iter().cloned())
            .with_libs(config.libs.clone())
    }
}
