//! Test suite planning
//!
//! Desktop targets get one executable per case plus an umbrella `test-all`.
//! Targets that deploy a single application get exactly one `test-all`
//! bundle aggregating every case.

use crate::artifact::ArtifactRole;
use crate::assembler::{ArtifactAssembler, ResourceSet, ResourceSets};
use crate::capability::ResourceSetKind;
use crate::configure::ConfigureContext;
use crate::error::BuildResult;
use crate::graph::{DependencyGraph, LibraryNode, NodeRef};
use crate::module::ModuleSpec;
use log::{debug, info};
use render_config::TestsConfig;
use std::path::{Path, PathBuf};

/// Name of the synthetic module aggregating all cases
pub const AGGREGATE_MODULE: &str = "all";
/// Library every test executable links first
pub const TEST_LIBRARY: &str = "test";

const DEFAULT_BASEPATH: &str = "test";
const DEFAULT_ENTRY: &str = "main.c";

/// How the suite is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerMode {
    /// One executable per case plus the umbrella
    PerCaseBinaries,
    /// One aggregated bundle
    MonolithicBundle,
}

impl PlannerMode {
    pub fn for_context(context: &ConfigureContext) -> Self {
        if context.target.is_monolithic_preferred() {
            Self::MonolithicBundle
        } else {
            Self::PerCaseBinaries
        }
    }
}

/// Ordered test cases and their shared layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseSet {
    cases: Vec<String>,
    basepath: PathBuf,
    entry: PathBuf,
    resources: ResourceSets,
}

impl TestCaseSet {
    pub fn new<S: Into<String>>(cases: impl IntoIterator<Item = S>) -> Self {
        Self {
            cases: cases.into_iter().map(Into::into).collect(),
            basepath: PathBuf::from(DEFAULT_BASEPATH),
            entry: PathBuf::from(DEFAULT_ENTRY),
            resources: ResourceSets::new(),
        }
    }

    pub fn with_basepath(mut self, basepath: impl Into<PathBuf>) -> Self {
        self.basepath = basepath.into();
        self
    }

    pub fn with_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_resources(mut self, kind: ResourceSetKind, set: ResourceSet) -> Self {
        self.resources.insert(kind, set);
        self
    }

    /// Build the case set from the `[tests]` manifest section
    pub fn from_config(config: &TestsConfig) -> BuildResult<Self> {
        let mut set = Self::new(config.cases.iter().cloned());
        if let Some(basepath) = &config.basepath {
            set.basepath = basepath.clone();
        }
        if let Some(entry) = &config.entry {
            set.entry = entry.clone();
        }
        for (name, resources) in &config.resources {
            let kind: ResourceSetKind = name.parse()?;
            set.resources.insert(kind, ResourceSet::from(resources));
        }
        Ok(set)
    }

    pub fn cases(&self) -> &[String] {
        &self.cases
    }

    pub fn basepath(&self) -> &Path {
        &self.basepath
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn resources(&self) -> &ResourceSets {
        &self.resources
    }

    /// Entry source of a case, relative to the basepath
    fn case_entry(&self, case: &str) -> PathBuf {
        Path::new(case).join(&self.entry)
    }

    /// Every case entry followed by the aggregate entry
    fn aggregate_sources(&self) -> Vec<PathBuf> {
        self.cases
            .iter()
            .map(|case| self.case_entry(case))
            .chain(std::iter::once(self.case_entry(AGGREGATE_MODULE)))
            .collect()
    }
}

/// Artifact name for a case
pub fn test_artifact_name(case: &str) -> String {
    format!("test-{}", case)
}

/// Plans test artifacts into the graph
pub struct TestSuitePlanner<'a> {
    context: &'a ConfigureContext,
    assembler: ArtifactAssembler<'a>,
}

impl<'a> TestSuitePlanner<'a> {
    pub fn new(context: &'a ConfigureContext) -> Self {
        Self {
            context,
            assembler: ArtifactAssembler::new(context),
        }
    }

    pub fn mode(&self) -> PlannerMode {
        PlannerMode::for_context(self.context)
    }

    /// Add the suite's artifacts to `graph`, each depending on `library`
    pub fn plan(
        &self,
        suite: &TestCaseSet,
        library: &LibraryNode,
        dependlibs: &[String],
        graph: &mut DependencyGraph,
    ) -> BuildResult<Vec<NodeRef>> {
        if suite.is_empty() {
            info!("No test cases declared, skipping test planning");
            return Ok(Vec::new());
        }

        let mut libs = vec![TEST_LIBRARY.to_string(), library.name().to_string()];
        libs.extend(dependlibs.iter().cloned());

        let mode = self.mode();
        debug!(
            "Planning {} test case(s) as {:?} for {}",
            suite.cases().len(),
            mode,
            self.context.target
        );

        match mode {
            PlannerMode::PerCaseBinaries => self.plan_per_case(suite, libs, library, graph),
            PlannerMode::MonolithicBundle => self
                .plan_monolithic(suite, libs, library, graph)
                .map(|node| vec![node]),
        }
    }

    fn plan_per_case(
        &self,
        suite: &TestCaseSet,
        libs: Vec<String>,
        library: &LibraryNode,
        graph: &mut DependencyGraph,
    ) -> BuildResult<Vec<NodeRef>> {
        let mut nodes = Vec::with_capacity(suite.cases().len() + 1);

        for case in suite.cases() {
            let module = ModuleSpec::new(test_artifact_name(case), suite.basepath())
                .with_sources([suite.case_entry(case)])
                .with_libs(libs.clone());

            let spec = if self.context.capabilities.bundle_tests {
                self.assembler
                    .app_bundle(&module, ArtifactRole::Test, suite.resources())?
            } else {
                self.assembler.binary(&module, ArtifactRole::Test)?
            };
            nodes.push(graph.add_artifact(spec, &[library])?);
        }

        let umbrella = ModuleSpec::new(test_artifact_name(AGGREGATE_MODULE), suite.basepath())
            .with_sources(suite.aggregate_sources())
            .with_libs(libs);
        let spec = self.assembler.binary(&umbrella, ArtifactRole::Test)?;
        nodes.push(graph.add_artifact(spec, &[library])?);

        Ok(nodes)
    }

    fn plan_monolithic(
        &self,
        suite: &TestCaseSet,
        libs: Vec<String>,
        library: &LibraryNode,
        graph: &mut DependencyGraph,
    ) -> BuildResult<NodeRef> {
        let mut sources = suite.aggregate_sources();
        sources.extend(self.context.capabilities.extra_test_sources.iter().cloned());

        let module = ModuleSpec::new(test_artifact_name(AGGREGATE_MODULE), suite.basepath())
            .with_sources(sources)
            .with_libs(libs);

        let spec = self
            .assembler
            .app_bundle(&module, ArtifactRole::Test, suite.resources())?;
        graph.add_artifact(spec, &[library])
    }
}
