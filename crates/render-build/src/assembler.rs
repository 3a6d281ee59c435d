//! Artifact assembly
//!
//! Turns a `ModuleSpec` into a concrete `ArtifactSpec` for the configured
//! target: conditional sources are resolved, graphics frameworks and
//! libraries from the capability row are appended, and bundle requests bind
//! the platform's resource set or degrade to a bare binary.

use crate::artifact::{ArtifactCommon, ArtifactRole, ArtifactSpec, BundleResources};
use crate::capability::ResourceSetKind;
use crate::configure::ConfigureContext;
use crate::error::BuildResult;
use crate::module::ModuleSpec;
use log::{debug, warn};
use render_config::ResourceSetConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resource files for one platform's bundles, relative to the module basepath
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    pub files: Vec<PathBuf>,
    pub entitlements: Option<PathBuf>,
}

impl From<&ResourceSetConfig> for ResourceSet {
    fn from(config: &ResourceSetConfig) -> Self {
        Self {
            files: config.files.clone(),
            entitlements: config.entitlements.clone(),
        }
    }
}

/// Resource sets a module declares, keyed by kind
pub type ResourceSets = BTreeMap<ResourceSetKind, ResourceSet>;

/// Assembles artifacts for one configuration run
pub struct ArtifactAssembler<'a> {
    context: &'a ConfigureContext,
}

impl<'a> ArtifactAssembler<'a> {
    pub fn new(context: &'a ConfigureContext) -> Self {
        Self { context }
    }

    /// Resolve the module's sources for the target
    ///
    /// Base sources come first, then each matching conditional group in
    /// declaration order. Later duplicates are dropped.
    pub fn resolve_sources(&self, module: &ModuleSpec) -> Vec<PathBuf> {
        let target = &self.context.target;
        let capabilities = &self.context.capabilities;

        let conditional = module
            .conditional_sources
            .iter()
            .filter(|group| group.condition.matches(target, capabilities))
            .flat_map(|group| group.sources.iter());

        let mut sources: Vec<PathBuf> = Vec::new();
        for source in module.base_sources.iter().chain(conditional) {
            let path = module.source_path(source);
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
        sources
    }

    /// Assemble a library; libraries link no graphics frameworks
    pub fn library(&self, module: &ModuleSpec) -> BuildResult<ArtifactSpec> {
        let common = self.common(module, ArtifactRole::Library, false);
        ArtifactSpec::library(common)
    }

    /// Assemble a bare executable
    pub fn binary(&self, module: &ModuleSpec, role: ArtifactRole) -> BuildResult<ArtifactSpec> {
        let common = self.common(module, role, true);
        ArtifactSpec::binary(common)
    }

    /// Assemble a tool binary, built only in the tool configurations
    pub fn tool(&self, module: &ModuleSpec) -> BuildResult<ArtifactSpec> {
        let common = self
            .common(module, ArtifactRole::Tool, true)
            .with_configs(self.context.toolchain.tool_configs());
        ArtifactSpec::binary(common)
    }

    /// Assemble an application bundle
    ///
    /// Binds the resource set named by the platform row. Degrades to a bare
    /// binary when the platform has no bundles or the module declares no
    /// matching resource set.
    pub fn app_bundle(
        &self,
        module: &ModuleSpec,
        role: ArtifactRole,
        resources: &ResourceSets,
    ) -> BuildResult<ArtifactSpec> {
        let capabilities = &self.context.capabilities;
        let platform = self.context.target.platform();

        let kind = match capabilities.resource_set {
            Some(kind) if capabilities.has_bundles() => kind,
            _ => {
                debug!(
                    "{} has no application bundles, building '{}' as a binary",
                    platform, module.name
                );
                return self.binary(module, role);
            }
        };

        let Some(set) = resources.get(&kind) else {
            warn!(
                "No {} resource set declared for '{}', building a binary instead of a bundle",
                kind, module.name
            );
            return self.binary(module, role);
        };

        let bundle = BundleResources {
            kind,
            style: capabilities.bundle,
            files: set.files.iter().map(|f| module.source_path(f)).collect(),
            entitlements: set.entitlements.as_deref().map(|f| module.source_path(f)),
        };

        let common = self.common(module, role, true);
        ArtifactSpec::app_bundle(common, bundle, capabilities.requires_entitlements)
    }

    fn common(
        &self,
        module: &ModuleSpec,
        role: ArtifactRole,
        link_graphics: bool,
    ) -> ArtifactCommon {
        let capabilities = &self.context.capabilities;

        let mut libs = module.libs.clone();
        let mut frameworks = module.frameworks.clone();
        if link_graphics {
            extend_unique(&mut frameworks, &capabilities.frameworks);
            extend_unique(&mut libs, &capabilities.libs);
        }

        let mut include_paths = module.include_paths.clone();
        include_paths.extend(self.context.hints.include_paths());
        let mut lib_paths = module.lib_paths.clone();
        lib_paths.extend(self.context.hints.lib_paths());

        ArtifactCommon::new(module.name.as_str(), role)
            .with_sources(self.resolve_sources(module))
            .with_libs(libs)
            .with_frameworks(frameworks)
            .with_include_paths(include_paths)
            .with_lib_paths(lib_paths)
            .with_configs(self.context.toolchain.available_configs().to_vec())
    }
}

fn extend_unique(into: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}
