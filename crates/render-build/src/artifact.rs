//! Artifact specifications: libraries, bare executables and app bundles
use crate::capability::{BundleStyle, ResourceSetKind};
use crate::error::{BuildError, BuildResult};
use crate::target::Platform;
use crate::toolchain::BuildConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Static library
    Library,
    /// Bare executable
    Binary,
    /// Platform application bundle
    #[serde(rename = "app")]
    AppBundle,
}

impl ArtifactKind {
    /// Build rule name used in the emitted graph
    pub fn rule_name(&self) -> &'static str {
        match self {
            Self::Library => "lib",
            Self::Binary => "bin",
            Self::AppBundle => "app",
        }
    }

    /// Conventional output directory for this kind
    pub fn output_dir_name(&self) -> &'static str {
        match self {
            Self::Library => "lib",
            Self::Binary | Self::AppBundle => "bin",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Library => write!(f, "library"),
            Self::Binary => write!(f, "binary"),
            Self::AppBundle => write!(f, "app bundle"),
        }
    }
}

/// What an artifact is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    /// Part of the project's public contract
    Library,
    /// Developer tool
    Tool,
    /// Test executable
    Test,
}

impl ArtifactRole {
    /// Whether a parent build composing this one sees the artifact
    pub fn is_exported(&self) -> bool {
        matches!(self, Self::Library)
    }
}

/// Fields shared by every artifact kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCommon {
    pub name: String,
    pub role: ArtifactRole,
    pub sources: Vec<PathBuf>,
    /// Artifacts that must be current before this one links
    pub implicit_deps: Vec<String>,
    pub libs: Vec<String>,
    pub frameworks: Vec<String>,
    pub include_paths: Vec<PathBuf>,
    pub lib_paths: Vec<PathBuf>,
    /// Configurations this artifact is built in; empty means all
    pub configs: Vec<BuildConfig>,
}

impl ArtifactCommon {
    pub fn new(name: impl Into<String>, role: ArtifactRole) -> Self {
        Self {
            name: name.into(),
            role,
            sources: Vec::new(),
            implicit_deps: Vec::new(),
            libs: Vec::new(),
            frameworks: Vec::new(),
            include_paths: Vec::new(),
            lib_paths: Vec::new(),
            configs: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
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

    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths;
        self
    }

    pub fn with_lib_paths(mut self, lib_paths: Vec<PathBuf>) -> Self {
        self.lib_paths = lib_paths;
        self
    }

    pub fn with_configs(mut self, configs: Vec<BuildConfig>) -> Self {
        self.configs = configs;
        self
    }

    pub fn with_implicit_deps(mut self, deps: Vec<String>) -> Self {
        self.implicit_deps = deps;
        self
    }

    fn validate(&self) -> BuildResult<()> {
        if self.name.is_empty() {
            return Err(BuildError::invalid_artifact("", "name cannot be empty"));
        }
        if self.sources.is_empty() {
            return Err(BuildError::invalid_artifact(&self.name, "no source files"));
        }
        if self.implicit_deps.iter().any(|d| d == &self.name) {
            return Err(BuildError::CyclicDependency {
                path: vec![self.name.clone(), self.name.clone()],
            });
        }
        Ok(())
    }
}

/// Resources bound into an application bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleResources {
    pub kind: ResourceSetKind,
    pub style: BundleStyle,
    /// Manifest, plist, xib, icon files copied into the bundle
    pub files: Vec<PathBuf>,
    pub entitlements: Option<PathBuf>,
}

/// A planned build output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtifactSpec {
    Library(ArtifactCommon),
    Binary(ArtifactCommon),
    #[serde(rename = "app")]
    AppBundle {
        #[serde(flatten)]
        common: ArtifactCommon,
        bundle: BundleResources,
    },
}

impl ArtifactSpec {
    /// Create a library artifact
    pub fn library(common: ArtifactCommon) -> BuildResult<Self> {
        common.validate()?;
        if common.role != ArtifactRole::Library {
            return Err(BuildError::invalid_artifact(
                &common.name,
                "libraries must have the library role",
            ));
        }
        Ok(Self::Library(common))
    }

    /// Create a bare executable artifact
    pub fn binary(common: ArtifactCommon) -> BuildResult<Self> {
        common.validate()?;
        Ok(Self::Binary(common))
    }

    /// Create an application bundle artifact
    ///
    /// `requires_entitlements` comes from the platform capability row.
    pub fn app_bundle(
        common: ArtifactCommon,
        bundle: BundleResources,
        requires_entitlements: bool,
    ) -> BuildResult<Self> {
        common.validate()?;
        if bundle.style.extension().is_none() {
            return Err(BuildError::invalid_artifact(
                &common.name,
                "bundle style produces no bundle",
            ));
        }
        if requires_entitlements && bundle.entitlements.is_none() {
            return Err(BuildError::invalid_artifact(
                &common.name,
                format!("{} bundles require an entitlements file", bundle.kind),
            ));
        }
        Ok(Self::AppBundle { common, bundle })
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Library(_) => ArtifactKind::Library,
            Self::Binary(_) => ArtifactKind::Binary,
            Self::AppBundle { .. } => ArtifactKind::AppBundle,
        }
    }

    pub fn common(&self) -> &ArtifactCommon {
        match self {
            Self::Library(common) | Self::Binary(common) => common,
            Self::AppBundle { common, .. } => common,
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut ArtifactCommon {
        match self {
            Self::Library(common) | Self::Binary(common) => common,
            Self::AppBundle { common, .. } => common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn role(&self) -> ArtifactRole {
        self.common().role
    }

    pub fn implicit_deps(&self) -> &[String] {
        &self.common().implicit_deps
    }

    pub fn bundle(&self) -> Option<&BundleResources> {
        match self {
            Self::AppBundle { bundle, .. } => Some(bundle),
            _ => None,
        }
    }

    /// Resource files the artifact carries
    pub fn resources(&self) -> Vec<PathBuf> {
        match self.bundle() {
            Some(bundle) => {
                let mut files = bundle.files.clone();
                files.extend(bundle.entitlements.iter().cloned());
                files
            }
            None => Vec::new(),
        }
    }

    /// Output path relative to the build directory
    pub fn output_path(&self, platform: Platform) -> PathBuf {
        let name = self.name();
        let file = match self {
            Self::Library(_) => platform.library_filename(name),
            Self::Binary(_) => platform.binary_filename(name),
            Self::AppBundle { bundle, .. } => match bundle.style.extension() {
                Some(ext) => format!("{}.{}", name, ext),
                None => platform.binary_filename(name),
            },
        };
        PathBuf::from(self.kind().output_dir_name()).join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(name: &str, role: ArtifactRole) -> ArtifactCommon {
        ArtifactCommon::new(name, role).with_sources(vec![PathBuf::from("main.c")])
    }

    fn ios_bundle(entitlements: Option<&str>) -> BundleResources {
        BundleResources {
            kind: ResourceSetKind::Ios,
            style: BundleStyle::App,
            files: vec![PathBuf::from("test/all/ios/test-all.plist")],
            entitlements: entitlements.map(PathBuf::from),
        }
    }

    #[test]
    fn test_kind_rule_names() {
        assert_eq!(ArtifactKind::Library.rule_name(), "lib");
        assert_eq!(ArtifactKind::Binary.rule_name(), "bin");
        assert_eq!(ArtifactKind::AppBundle.rule_name(), "app");
        assert_eq!(ArtifactKind::AppBundle.to_string(), "app bundle");
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = ArtifactSpec::binary(common("", ArtifactRole::Tool));
        assert!(matches!(result, Err(BuildError::InvalidArtifact { .. })));
    }

    #[test]
    fn test_no_sources_rejected() {
        let result = ArtifactSpec::library(ArtifactCommon::new("render", ArtifactRole::Library));
        assert!(matches!(result, Err(BuildError::InvalidArtifact { .. })));
    }

    #[test]
    fn test_library_requires_library_role() {
        assert!(ArtifactSpec::library(common("render", ArtifactRole::Test)).is_err());
        assert!(ArtifactSpec::library(common("render", ArtifactRole::Library)).is_ok());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let c = common("test-all", ArtifactRole::Test).with_implicit_deps(vec!["test-all".into()]);
        assert!(matches!(
            ArtifactSpec::binary(c),
            Err(BuildError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_bundle_entitlements_enforced() {
        let missing = ArtifactSpec::app_bundle(
            common("test-all", ArtifactRole::Test),
            ios_bundle(None),
            true,
        );
        assert!(missing.is_err());

        let present = ArtifactSpec::app_bundle(
            common("test-all", ArtifactRole::Test),
            ios_bundle(Some("test/all/ios/test-all.entitlements")),
            true,
        )
        .unwrap();
        assert_eq!(present.resources().len(), 2);
    }

    #[test]
    fn test_bundle_style_none_rejected() {
        let mut bundle = ios_bundle(None);
        bundle.style = BundleStyle::None;
        assert!(ArtifactSpec::app_bundle(common("t", ArtifactRole::Test), bundle, false).is_err());
    }

    #[test]
    fn test_output_paths() {
        let lib = ArtifactSpec::library(common("render", ArtifactRole::Library)).unwrap();
        assert_eq!(lib.output_path(Platform::Linux), PathBuf::from("lib/librender.a"));
        assert_eq!(lib.output_path(Platform::Windows), PathBuf::from("lib/render.lib"));

        let bin = ArtifactSpec::binary(common("renderimport", ArtifactRole::Tool)).unwrap();
        assert_eq!(
            bin.output_path(Platform::Windows),
            PathBuf::from("bin/renderimport.exe")
        );

        let app = ArtifactSpec::app_bundle(
            common("test-all", ArtifactRole::Test),
            ios_bundle(None),
            false,
        )
        .unwrap();
        assert_eq!(app.output_path(Platform::Ios), PathBuf::from("bin/test-all.app"));
        assert_eq!(app.kind(), ArtifactKind::AppBundle);
        assert!(lib.bundle().is_none());
    }

    #[test]
    fn test_roles_exported() {
        assert!(ArtifactRole::Library.is_exported());
        assert!(!ArtifactRole::Tool.is_exported());
        assert!(!ArtifactRole::Test.is_exported());
    }
}
