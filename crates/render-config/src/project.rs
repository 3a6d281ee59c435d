//! Project manifest (rendergen.toml)
//!
//! The manifest is the static module declaration the planner consumes: the
//! render library, tool binaries, test cases, toolchain defaults, capability
//! overrides and SDK hints. Platform and backend names stay plain strings here;
//! the build crate parses them against its own enums.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Project manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSection>,

    /// The library module every other artifact links against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryConfig>,

    /// Developer tool binaries
    #[serde(default, rename = "tool")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolConfig>,

    /// Test suite declaration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestsConfig>,

    /// Toolchain defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,

    /// Capability table overrides keyed by platform name
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platforms: BTreeMap<String, PlatformOverride>,

    /// SDK hints keyed by SDK name
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sdk: BTreeMap<String, SdkConfig>,
}

/// `[project]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project name, also the default library name
    pub name: String,

    /// Libraries this project links against but does not build
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependlibs: Vec<String>,
}

/// `[library]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Library name (defaults to the project name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Directory the sources are relative to (defaults to the library name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepath: Option<PathBuf>,

    /// Unconditional sources
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Backend- or platform-conditional sources
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditional: Vec<ConditionalConfig>,

    /// Extra include paths
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includepaths: Vec<PathBuf>,
}

/// One `[[library.conditional]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConditionalConfig {
    /// Included when the target platform is one of these
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,

    /// Included when the target platform supports this backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Sources to include
    pub sources: Vec<PathBuf>,
}

/// One `[[tool]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Binary name
    pub name: String,

    /// Directory the sources are relative to (defaults to `tools/<name>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepath: Option<PathBuf>,

    /// Tool sources
    pub sources: Vec<PathBuf>,

    /// Extra libraries beyond the project's own
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,
}

/// `[tests]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TestsConfig {
    /// Directory holding one subdirectory per case (default: "test")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepath: Option<PathBuf>,

    /// Entry source inside each case directory (default: "main.c")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Test case names
    #[serde(default)]
    pub cases: Vec<String>,

    /// Resource sets keyed by platform name, relative to the test basepath
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, ResourceSetConfig>,
}

/// A platform resource set for bundled artifacts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResourceSetConfig {
    /// Manifest, plist, xib, icon and similar files
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Entitlements file for restricted platforms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entitlements: Option<PathBuf>,
}

/// `[toolchain]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Available build configurations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configs: Option<Vec<String>>,

    /// Force a single monolithic test binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monolithic: Option<bool>,
}

/// `[platforms.<name>]` capability override; unset fields keep the built-in row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PlatformOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frameworks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backends: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monolithic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_tools: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_tests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_entitlements: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_test_sources: Option<Vec<PathBuf>>,
}

/// `[sdk.<name>]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    /// Environment variable holding the SDK root
    pub variable: String,

    /// Include directory relative to the root (default: "include")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,

    /// Library directory relative to the root (default: "lib")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load the manifest from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the manifest
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(project) = &self.project {
            if project.name.is_empty() {
                return Err(invalid("project.name", "name cannot be empty"));
            }
            if project.dependlibs.iter().any(String::is_empty) {
                return Err(invalid("project.dependlibs", "library names cannot be empty"));
            }
        }

        if let Some(library) = &self.library {
            if library.name.as_deref() == Some("") {
                return Err(invalid("library.name", "name cannot be empty"));
            }
            for (index, conditional) in library.conditional.iter().enumerate() {
                validate_conditional(index, conditional)?;
            }
        }

        let mut tool_names = HashSet::new();
        for tool in &self.tools {
            if tool.name.is_empty() {
                return Err(invalid("tool.name", "name cannot be empty"));
            }
            if !tool_names.insert(tool.name.as_str()) {
                return Err(invalid(
                    "tool.name",
                    &format!("duplicate tool '{}'", tool.name),
                ));
            }
        }

        if let Some(tests) = &self.tests {
            let mut seen = HashSet::new();
            for case in &tests.cases {
                if case.is_empty() {
                    return Err(invalid("tests.cases", "case names cannot be empty"));
                }
                // "all" is the synthetic aggregate and cannot be declared
                if case == "all" {
                    return Err(invalid("tests.cases", "'all' is reserved"));
                }
                if !seen.insert(case.as_str()) {
                    return Err(invalid("tests.cases", &format!("duplicate case '{}'", case)));
                }
            }
        }

        for (name, sdk) in &self.sdk {
            if sdk.variable.is_empty() {
                return Err(invalid(
                    &format!("sdk.{}.variable", name),
                    "variable cannot be empty",
                ));
            }
        }

        Ok(())
    }

    /// Get the project name, if present
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// Libraries the project links but does not build
    pub fn dependlibs(&self) -> &[String] {
        self.project
            .as_ref()
            .map(|p| p.dependlibs.as_slice())
            .unwrap_or(&[])
    }

    /// Effective library name: `[library].name`, else the project name
    pub fn library_name(&self) -> Option<&str> {
        self.library
            .as_ref()
            .and_then(|l| l.name.as_deref())
            .or_else(|| self.project_name())
    }
}

fn validate_conditional(index: usize, conditional: &ConditionalConfig) -> ConfigResult<()> {
    let field = format!("library.conditional[{}]", index);
    match (&conditional.platforms, &conditional.backend) {
        (Some(_), Some(_)) | (None, None) => Err(invalid(
            &field,
            "exactly one of 'platforms' or 'backend' must be set",
        )),
        (Some(platforms), None) if platforms.is_empty() => {
            Err(invalid(&field, "platform list cannot be empty"))
        }
        (None, Some(backend)) if backend.is_empty() => {
            Err(invalid(&field, "backend cannot be empty"))
        }
        _ => Ok(()),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
