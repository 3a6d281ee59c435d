//! Dependency graph of planned artifacts
//!
//! Nodes are artifacts in insertion order; edges are implicit dependencies by
//! artifact name. Every insertion is checked so the graph stays acyclic and no
//! library ever depends on an executable. A rejected insertion leaves the graph
//! untouched.
use crate::artifact::{ArtifactKind, ArtifactSpec};
use crate::error::{BuildError, BuildResult};
use std::collections::{HashMap, HashSet};

/// Handle to a library node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryNode(String);

/// Handle to a binary node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryNode(String);

/// Handle to an app bundle node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppBundleNode(String);

impl LibraryNode {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl BinaryNode {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl AppBundleNode {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Handle returned when the artifact kind is only known at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Library(LibraryNode),
    Binary(BinaryNode),
    AppBundle(AppBundleNode),
}

impl NodeRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Library(node) => node.name(),
            Self::Binary(node) => node.name(),
            Self::AppBundle(node) => node.name(),
        }
    }
}

/// Graph of artifacts and their implicit dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<ArtifactSpec>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library
    ///
    /// The library's own implicit dependencies may name artifacts that are
    /// added later.
    pub fn add_library(&mut self, spec: ArtifactSpec) -> BuildResult<LibraryNode> {
        self.expect_kind(&spec, ArtifactKind::Library)?;
        let name = self.insert(spec, &[])?;
        Ok(LibraryNode(name))
    }

    /// Add a binary that links the given libraries
    ///
    /// At least one library is required so the binary is always relinked
    /// after it.
    pub fn add_binary(
        &mut self,
        spec: ArtifactSpec,
        implicit_deps: &[&LibraryNode],
    ) -> BuildResult<BinaryNode> {
        self.expect_kind(&spec, ArtifactKind::Binary)?;
        expect_linked(&spec, implicit_deps)?;
        let name = self.insert(spec, implicit_deps)?;
        Ok(BinaryNode(name))
    }

    /// Add an application bundle that links the given libraries
    pub fn add_app_bundle(
        &mut self,
        spec: ArtifactSpec,
        implicit_deps: &[&LibraryNode],
    ) -> BuildResult<AppBundleNode> {
        self.expect_kind(&spec, ArtifactKind::AppBundle)?;
        expect_linked(&spec, implicit_deps)?;
        let name = self.insert(spec, implicit_deps)?;
        Ok(AppBundleNode(name))
    }

    /// Add an artifact of any kind
    pub fn add_artifact(
        &mut self,
        spec: ArtifactSpec,
        implicit_deps: &[&LibraryNode],
    ) -> BuildResult<NodeRef> {
        match spec.kind() {
            ArtifactKind::Library => {
                let mut spec = spec;
                append_deps(&mut spec, implicit_deps);
                self.add_library(spec).map(NodeRef::Library)
            }
            ArtifactKind::Binary => self.add_binary(spec, implicit_deps).map(NodeRef::Binary),
            ArtifactKind::AppBundle => self
                .add_app_bundle(spec, implicit_deps)
                .map(NodeRef::AppBundle),
        }
    }

    fn expect_kind(&self, spec: &ArtifactSpec, kind: ArtifactKind) -> BuildResult<()> {
        if spec.kind() == kind {
            Ok(())
        } else {
            Err(BuildError::invalid_artifact(
                spec.name(),
                format!("expected a {}, got a {}", kind, spec.kind()),
            ))
        }
    }

    fn insert(
        &mut self,
        mut spec: ArtifactSpec,
        implicit_deps: &[&LibraryNode],
    ) -> BuildResult<String> {
        append_deps(&mut spec, implicit_deps);
        let name = spec.name().to_string();

        if self.index.contains_key(&name) {
            return Err(BuildError::DuplicateArtifact { name });
        }

        self.check_kinds(&spec)?;

        if let Some(path) = self.cycle_through(&name, spec.implicit_deps()) {
            return Err(BuildError::CyclicDependency { path });
        }

        self.index.insert(name.clone(), self.nodes.len());
        self.nodes.push(spec);
        Ok(name)
    }

    /// A library never depends on an executable, in either insertion order
    fn check_kinds(&self, spec: &ArtifactSpec) -> BuildResult<()> {
        if spec.kind() == ArtifactKind::Library {
            for dep in spec.implicit_deps() {
                if let Some(existing) = self.get(dep) {
                    if existing.kind() != ArtifactKind::Library {
                        return Err(BuildError::InvalidDependency {
                            library: spec.name().to_string(),
                            dependency: dep.clone(),
                            kind: existing.kind().to_string(),
                        });
                    }
                }
            }
        } else {
            for node in &self.nodes {
                if node.kind() == ArtifactKind::Library
                    && node.implicit_deps().iter().any(|d| d == spec.name())
                {
                    return Err(BuildError::InvalidDependency {
                        library: node.name().to_string(),
                        dependency: spec.name().to_string(),
                        kind: spec.kind().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Path from `name` back to itself if adding `name -> deps` closes a cycle
    fn cycle_through(&self, name: &str, deps: &[String]) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut path = vec![name.to_string()];
        for dep in deps {
            if self.dfs_reaches(dep, name, &mut visited, &mut path) {
                return Some(path);
            }
        }
        None
    }

    fn dfs_reaches(
        &self,
        current: &str,
        goal: &str,
        visited: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> bool {
        path.push(current.to_string());
        if current == goal {
            return true;
        }
        if visited.insert(current.to_string()) {
            if let Some(node) = self.get(current) {
                for dep in node.implicit_deps() {
                    if self.dfs_reaches(dep, goal, visited, path) {
                        return true;
                    }
                }
            }
        }
        path.pop();
        false
    }

    /// Get an artifact by name
    pub fn get(&self, name: &str) -> Option<&ArtifactSpec> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Artifacts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactSpec> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of implicit dependency edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.implicit_deps().len()).sum()
    }

    /// Library artifacts a parent build may depend on
    pub fn exported_libraries(&self) -> Vec<&ArtifactSpec> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == ArtifactKind::Library && n.role().is_exported())
            .collect()
    }

    /// Check that every dependency names a declared artifact
    pub fn validate(&self) -> BuildResult<()> {
        for node in &self.nodes {
            for dep in node.implicit_deps() {
                if !self.index.contains_key(dep) {
                    return Err(BuildError::missing_dependency(node.name(), dep.as_str()));
                }
            }
        }
        Ok(())
    }

    /// Topological order: dependencies first, ties broken by insertion order
    pub fn topological_order(&self) -> BuildResult<Vec<&ArtifactSpec>> {
        self.validate()?;

        let mut placed: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let next = self.nodes.iter().find(|node| {
                !placed.contains(node.name())
                    && node
                        .implicit_deps()
                        .iter()
                        .all(|d| placed.contains(d.as_str()))
            });

            match next {
                Some(node) => {
                    placed.insert(node.name());
                    order.push(node);
                }
                None => {
                    return Err(BuildError::CyclicDependency {
                        path: self.find_cycle(),
                    })
                }
            }
        }

        Ok(order)
    }

    /// Groups of artifacts that can be built concurrently
    pub fn build_levels(&self) -> BuildResult<Vec<Vec<String>>> {
        self.validate()?;

        let mut levels = Vec::new();
        let mut built = HashSet::new();

        loop {
            let mut level: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| !built.contains(n.name()))
                .filter(|n| n.implicit_deps().iter().all(|d| built.contains(d.as_str())))
                .map(|n| n.name().to_string())
                .collect();

            if level.is_empty() {
                break;
            }

            // Sort level for deterministic output
            level.sort();
            for name in &level {
                built.insert(name.clone());
            }
            levels.push(level);
        }

        if built.len() != self.nodes.len() {
            return Err(BuildError::CyclicDependency {
                path: self.find_cycle(),
            });
        }

        Ok(levels)
    }

    /// Find a cycle in the graph (for error reporting)
    fn find_cycle(&self) -> Vec<String> {
        for node in &self.nodes {
            if let Some(path) = self.cycle_through(node.name(), node.implicit_deps()) {
                return path;
            }
        }
        vec!["unknown cycle".to_string()]
    }
}

fn append_deps(spec: &mut ArtifactSpec, implicit_deps: &[&LibraryNode]) {
    let deps = &mut spec.common_mut().implicit_deps;
    for node in implicit_deps {
        if !deps.iter().any(|d| d == node.name()) {
            deps.push(node.name().to_string());
        }
    }
}

/// Executables must name the library they link
fn expect_linked(spec: &ArtifactSpec, implicit_deps: &[&LibraryNode]) -> BuildResult<()> {
    if implicit_deps.is_empty() {
        return Err(BuildError::invalid_artifact(
            spec.name(),
            format!("a {} must link at least one library", spec.kind()),
        ));
    }
    Ok(())
}
