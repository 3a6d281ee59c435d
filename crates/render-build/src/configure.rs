//! Configuration runs
//!
//! A run resolves the target, capability row, toolchain configurations and
//! environment hints into one `ConfigureContext`, plans the library, tools
//! and tests into a fresh dependency graph, and hands the result to the
//! emitter.

use crate::artifact::{ArtifactKind, ArtifactRole};
use crate::assembler::ArtifactAssembler;
use crate::capability::{CapabilityTable, PlatformCapabilities};
use crate::emitter::{BuildFile, BuildGraphEmitter, EmitOptions};
use crate::error::{BuildError, BuildResult};
use crate::graph::{DependencyGraph, LibraryNode};
use crate::module::ModuleSpec;
use crate::target::{Platform, Target};
use crate::test_plan::{TestCaseSet, TestSuitePlanner};
use crate::toolchain::{BuildConfig, ToolchainConfigSet};
use log::{debug, info};
use render_config::{
    Config, ConfigError, ConfigLoader, EnvironmentHints, ProjectConfig, MANIFEST_FILE,
};
use std::path::Path;
use std::time::{Duration, Instant};

/// Everything resolved for one configuration run
#[derive(Debug, Clone)]
pub struct ConfigureContext {
    pub target: Target,
    /// Capability row of the target platform, overrides applied
    pub capabilities: PlatformCapabilities,
    pub toolchain: ToolchainConfigSet,
    pub hints: EnvironmentHints,
}

impl ConfigureContext {
    pub fn new(
        platform: Platform,
        table: &CapabilityTable,
        toolchain: ToolchainConfigSet,
        hints: EnvironmentHints,
        toolchain_monolithic: bool,
    ) -> Self {
        let capabilities = table.get(platform).clone();
        let target = Target::new(platform, &capabilities, toolchain_monolithic);
        Self {
            target,
            capabilities,
            toolchain,
            hints,
        }
    }
}

/// Configuration statistics
#[derive(Debug, Clone, Default)]
pub struct ConfigureStats {
    pub libraries: usize,
    pub binaries: usize,
    pub bundles: usize,
    pub tools: usize,
    pub tests: usize,
    /// Implicit dependency edges
    pub edges: usize,
    /// Number of parallel build levels
    pub build_levels: usize,
    pub planning_time: Duration,
}

impl ConfigureStats {
    fn collect(graph: &DependencyGraph, build_levels: usize, planning_time: Duration) -> Self {
        let mut stats = Self {
            edges: graph.edge_count(),
            build_levels,
            planning_time,
            ..Default::default()
        };
        for artifact in graph.iter() {
            match artifact.kind() {
                ArtifactKind::Library => stats.libraries += 1,
                ArtifactKind::Binary => stats.binaries += 1,
                ArtifactKind::AppBundle => stats.bundles += 1,
            }
            match artifact.role() {
                ArtifactRole::Tool => stats.tools += 1,
                ArtifactRole::Test => stats.tests += 1,
                ArtifactRole::Library => {}
            }
        }
        stats
    }
}

/// Result of a successful configuration run
#[derive(Debug)]
pub struct Configuration {
    graph: DependencyGraph,
    context: ConfigureContext,
    options: EmitOptions,
    stats: ConfigureStats,
}

impl Configuration {
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn context(&self) -> &ConfigureContext {
        &self.context
    }

    pub fn stats(&self) -> &ConfigureStats {
        &self.stats
    }

    /// Library artifacts a parent build may depend on, by name
    pub fn exported_libraries(&self) -> Vec<String> {
        self.graph
            .exported_libraries()
            .into_iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Groups of artifacts that can be built concurrently
    pub fn build_levels(&self) -> BuildResult<Vec<Vec<String>>> {
        self.graph.build_levels()
    }

    /// Serialize the planned graph
    pub fn emit(&self) -> BuildResult<BuildFile> {
        BuildGraphEmitter::new(&self.context, self.options).emit(&self.graph)
    }
}

/// Plans a project for one target
pub struct Configurator {
    config: Config,
    platform: Option<Platform>,
    monolithic: Option<bool>,
    configs: Option<Vec<String>>,
    nested: bool,
}

impl Configurator {
    /// Load the manifest found at or above `project_dir`
    pub fn new(project_dir: impl AsRef<Path>) -> BuildResult<Self> {
        let project_dir = project_dir.as_ref();
        let config = ConfigLoader::new().load_from_directory(project_dir)?;
        if !config.is_project() {
            return Err(ConfigError::NotFound(project_dir.join(MANIFEST_FILE)).into());
        }
        Ok(Self::from_config(config))
    }

    /// Use an already loaded configuration
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            platform: None,
            monolithic: None,
            configs: None,
            nested: false,
        }
    }

    /// Set the target platform (defaults to the host)
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Force or suppress monolithic test builds on every platform
    pub fn with_monolithic(mut self, monolithic: bool) -> Self {
        self.monolithic = Some(monolithic);
        self
    }

    /// Override the configuration list
    pub fn with_configs(mut self, configs: Vec<String>) -> Self {
        self.configs = Some(configs);
        self
    }

    /// Configure as part of a parent build
    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Directory holding the discovered manifest
    pub fn project_root(&self) -> Option<&Path> {
        self.config.project_root()
    }

    fn project(&self) -> &ProjectConfig {
        &self.config.project
    }

    fn toolchain(&self) -> ToolchainConfigSet {
        match (&self.configs, self.config.configs()) {
            (Some(configs), _) => ToolchainConfigSet::from_names(configs),
            (None, Some(configs)) => ToolchainConfigSet::from_names(configs),
            (None, None) => ToolchainConfigSet::new(BuildConfig::defaults()),
        }
    }

    /// Resolve the run context
    pub fn context(&self) -> BuildResult<ConfigureContext> {
        let platform = match self.platform {
            Some(platform) => platform,
            None => Platform::host()?,
        };
        let table = CapabilityTable::with_overrides(&self.project().platforms)?;
        let monolithic = self
            .monolithic
            .unwrap_or_else(|| self.config.toolchain_monolithic());

        Ok(ConfigureContext::new(
            platform,
            &table,
            self.toolchain(),
            self.config.hints.clone(),
            monolithic,
        ))
    }

    /// Plan the project
    pub fn configure(&self) -> BuildResult<Configuration> {
        let start = Instant::now();
        let context = self.context()?;
        let project = self.project();

        info!(
            "Configuring {} for {} [{}]",
            project.project_name().unwrap_or("project"),
            context.target,
            context.toolchain.names().join(", ")
        );

        let mut graph = DependencyGraph::new();
        let library = self.plan_library(&context, &mut graph)?;
        self.plan_tools(&context, &library, &mut graph)?;

        if let Some(tests) = &project.tests {
            let suite = TestCaseSet::from_config(tests)?;
            let planner = TestSuitePlanner::new(&context);
            planner.plan(&suite, &library, project.dependlibs(), &mut graph)?;
        } else {
            debug!("No [tests] section, skipping test planning");
        }

        graph.validate()?;
        let levels = graph.build_levels()?;
        let stats = ConfigureStats::collect(&graph, levels.len(), start.elapsed());

        info!(
            "Planned {} artifact(s) ({} libraries, {} tools, {} tests) in {} level(s)",
            graph.len(),
            stats.libraries,
            stats.tools,
            stats.tests,
            stats.build_levels
        );

        Ok(Configuration {
            graph,
            context,
            options: EmitOptions {
                nested: self.nested,
            },
            stats,
        })
    }

    fn plan_library(
        &self,
        context: &ConfigureContext,
        graph: &mut DependencyGraph,
    ) -> BuildResult<LibraryNode> {
        let project = self.project();
        let config = project
            .library
            .as_ref()
            .ok_or_else(|| BuildError::InvalidManifest("missing [library] section".to_string()))?;
        let name = project.library_name().ok_or_else(|| {
            BuildError::InvalidManifest(
                "library has no name; set [project].name or [library].name".to_string(),
            )
        })?;

        let module = ModuleSpec::from_library_config(name, config, project.dependlibs())?;
        let spec = ArtifactAssembler::new(context).library(&module)?;
        graph.add_library(spec)
    }

    fn plan_tools(
        &self,
        context: &ConfigureContext,
        library: &LibraryNode,
        graph: &mut DependencyGraph,
    ) -> BuildResult<()> {
        let project = self.project();
        if project.tools.is_empty() {
            return Ok(());
        }
        if context.toolchain.tool_configs().is_empty() {
            debug!("No tool configurations available, skipping tools");
            return Ok(());
        }
        if !context.capabilities.host_tools {
            debug!("{} does not build tools", context.target.platform());
            return Ok(());
        }

        let assembler = ArtifactAssembler::new(context);
        for tool in &project.tools {
            let mut libs = vec![library.name().to_string()];
            libs.extend(project.dependlibs().iter().cloned());
            libs.extend(tool.libs.iter().cloned());

            let module = ModuleSpec::from_tool_config(tool).with_libs(libs);
            let spec = assembler.tool(&module)?;
            graph.add_binary(spec, &[library])?;
        }
        Ok(())
    }
}
