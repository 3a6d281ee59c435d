//! Build graph emission
//!
//! Serializes a validated dependency graph into a `BuildFile`: one rule per
//! artifact in dependency order and one edge per implicit dependency. The
//! same graph always produces byte-identical output.

use crate::artifact::{ArtifactKind, ArtifactRole, ArtifactSpec};
use crate::configure::ConfigureContext;
use crate::error::{BuildError, BuildResult};
use crate::graph::DependencyGraph;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Ninja file providing the `lib`, `bin` and `app` rules for a toolchain
pub const TOOLCHAIN_RULES_FILE: &str = "toolchain.ninja";

/// Emission options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Composed into a parent build: only exported libraries are emitted
    pub nested: bool,
}

/// Output format of the build file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Ninja,
    Json,
}

impl OutputFormat {
    /// Default output file name for this format
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Ninja => "build.ninja",
            Self::Json => "build.json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ninja" => Ok(Self::Ninja),
            "json" => Ok(Self::Json),
            other => Err(BuildError::InvalidManifest(format!(
                "unknown output format '{}'",
                other
            ))),
        }
    }
}

/// One build statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRule {
    pub name: String,
    pub kind: ArtifactKind,
    pub role: ArtifactRole,
    /// Output path relative to the build directory
    pub output: PathBuf,
    pub sources: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lib_paths: Vec<PathBuf>,
    pub configs: Vec<String>,
    /// Outputs of the artifacts this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implicit: Vec<PathBuf>,
}

/// Implicit dependency edge between two artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEdge {
    pub from: String,
    pub to: String,
}

/// Emitted build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFile {
    pub platform: String,
    pub configs: Vec<String>,
    pub rules: Vec<BuildRule>,
    pub edges: Vec<BuildEdge>,
}

impl BuildFile {
    /// Rule for an artifact
    pub fn rule(&self, name: &str) -> Option<&BuildRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> BuildResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Serialize as a Ninja build file
    pub fn to_ninja(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Generated by rendergen, do not edit");
        let _ = writeln!(out, "ninja_required_version = 1.3");
        let _ = writeln!(out, "platform = {}", self.platform);
        let _ = writeln!(out, "configs = {}", self.configs.join(" "));
        let _ = writeln!(out, "include {}", TOOLCHAIN_RULES_FILE);

        for rule in &self.rules {
            out.push('\n');
            let _ = write!(
                out,
                "build {}: {}",
                escape_path(&rule.output),
                rule.kind.rule_name()
            );
            for source in &rule.sources {
                let _ = write!(out, " {}", escape_path(source));
            }
            if !rule.implicit.is_empty() {
                out.push_str(" |");
                for dep in &rule.implicit {
                    let _ = write!(out, " {}", escape_path(dep));
                }
            }
            out.push('\n');

            let _ = writeln!(out, "  name = {}", rule.name);
            let _ = writeln!(out, "  role = {}", role_name(rule.role));
            let _ = writeln!(out, "  configs = {}", rule.configs.join(" "));
            write_list(&mut out, "resources", rule.resources.iter().map(|p| escape_path(p)));
            write_list(&mut out, "libs", rule.libs.iter().cloned());
            write_list(&mut out, "frameworks", rule.frameworks.iter().cloned());
            write_list(
                &mut out,
                "includepaths",
                rule.include_paths.iter().map(|p| escape_path(p)),
            );
            write_list(&mut out, "libpaths", rule.lib_paths.iter().map(|p| escape_path(p)));
        }

        out
    }

    /// Render in the given format
    pub fn render(&self, format: OutputFormat) -> BuildResult<String> {
        match format {
            OutputFormat::Ninja => Ok(self.to_ninja()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// SHA-256 of the Ninja text, hex encoded
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_ninja().as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Write the build file in `format` to `path`
    ///
    /// Returns `false` when the file already held identical content.
    pub fn write_atomic(&self, path: &Path, format: OutputFormat) -> BuildResult<bool> {
        let contents = self.render(format)?;
        write_atomic(path, contents.as_bytes())
    }
}

/// Replace `path` with `contents` via a temp file in the same directory
///
/// A failed write leaves any existing file untouched. Returns `false` when the
/// existing file already holds `contents`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> BuildResult<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents {
            debug!("{} is up to date", path.display());
            return Ok(false);
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| BuildError::io(&dir, e))?;

    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(|e| BuildError::io(&dir, e))?;
    file.write_all(contents)
        .map_err(|e| BuildError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| BuildError::io(path, e.error))?;

    debug!("Wrote {}", path.display());
    Ok(true)
}

fn write_list(out: &mut String, key: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if !items.is_empty() {
        let _ = writeln!(out, "  {} = {}", key, items.join(" "));
    }
}

fn role_name(role: ArtifactRole) -> &'static str {
    match role {
        ArtifactRole::Library => "library",
        ArtifactRole::Tool => "tool",
        ArtifactRole::Test => "test",
    }
}

/// Escape a path for Ninja; separators are always forward slashes
fn escape_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '$' => escaped.push_str("$$"),
            ' ' => escaped.push_str("$ "),
            ':' => escaped.push_str("$:"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Emits build files for one configuration run
pub struct BuildGraphEmitter<'a> {
    context: &'a ConfigureContext,
    options: EmitOptions,
}

impl<'a> BuildGraphEmitter<'a> {
    pub fn new(context: &'a ConfigureContext, options: EmitOptions) -> Self {
        Self { context, options }
    }

    fn is_emitted(&self, artifact: &ArtifactSpec) -> bool {
        !self.options.nested || artifact.role().is_exported()
    }

    /// Validate and serialize the graph
    pub fn emit(&self, graph: &DependencyGraph) -> BuildResult<BuildFile> {
        let platform = self.context.target.platform();
        let order = graph.topological_order()?;

        let outputs: HashMap<&str, PathBuf> = order
            .iter()
            .map(|a| (a.name(), a.output_path(platform)))
            .collect();

        let mut rules = Vec::new();
        let mut edges = Vec::new();

        for artifact in order.into_iter().filter(|a| self.is_emitted(a)) {
            let common = artifact.common();

            let mut implicit = Vec::with_capacity(common.implicit_deps.len());
            for dep in &common.implicit_deps {
                edges.push(BuildEdge {
                    from: artifact.name().to_string(),
                    to: dep.clone(),
                });
                if let Some(output) = outputs.get(dep.as_str()) {
                    implicit.push(output.clone());
                }
            }

            rules.push(BuildRule {
                name: common.name.clone(),
                kind: artifact.kind(),
                role: common.role,
                output: outputs
                    .get(artifact.name())
                    .cloned()
                    .unwrap_or_else(|| artifact.output_path(platform)),
                sources: common.sources.clone(),
                resources: artifact.resources(),
                libs: common.libs.clone(),
                frameworks: common.frameworks.clone(),
                include_paths: common.include_paths.clone(),
                lib_paths: common.lib_paths.clone(),
                configs: common.configs.iter().map(|c| c.name().to_string()).collect(),
                implicit,
            });
        }

        if self.options.nested {
            debug!(
                "Nested build: emitting {} of {} artifact(s)",
                rules.len(),
                graph.len()
            );
        }

        Ok(BuildFile {
            platform: platform.name().to_string(),
            configs: self.context.toolchain.names(),
            rules,
            edges,
        })
    }
}
