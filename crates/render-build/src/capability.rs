//! Platform capability table
//!
//! All per-platform facts the planner needs live in one table: graphics
//! frameworks and libraries, which backends compile, which resource set a
//! bundle takes and what the bundle looks like. The table is looked up once
//! per run. New platform or backend combinations are table edits, either in
//! `builtin()` or in the manifest's `[platforms.<name>]` overrides.

use crate::error::{BuildError, BuildResult};
use crate::target::Platform;
use render_config::PlatformOverride;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Render backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Gl2,
    Gl4,
    Gles2,
    Vulkan,
    Metal,
    Directx12,
    Null,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gl2 => "gl2",
            Self::Gl4 => "gl4",
            Self::Gles2 => "gles2",
            Self::Vulkan => "vulkan",
            Self::Metal => "metal",
            Self::Directx12 => "directx12",
            Self::Null => "null",
        }
    }
}

impl FromStr for Backend {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gl2" => Ok(Self::Gl2),
            "gl4" => Ok(Self::Gl4),
            "gles2" | "gles" => Ok(Self::Gles2),
            "vulkan" => Ok(Self::Vulkan),
            "metal" => Ok(Self::Metal),
            "directx12" | "dx12" => Ok(Self::Directx12),
            "null" => Ok(Self::Null),
            _ => Err(BuildError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which resource set an application bundle binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSetKind {
    MacOS,
    Ios,
    Android,
    Tizen,
}

impl ResourceSetKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MacOS => "macos",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Tizen => "tizen",
        }
    }
}

impl FromStr for ResourceSetKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macos" | "macosx" => Ok(Self::MacOS),
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "tizen" => Ok(Self::Tizen),
            other => Err(BuildError::InvalidManifest(format!(
                "unknown resource set '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ResourceSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a platform application bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleStyle {
    /// No bundle concept; bundle requests degrade to bare binaries
    None,
    /// Apple `.app` directory
    App,
    /// Android package
    Apk,
    /// Tizen package
    Tpk,
}

impl BundleStyle {
    /// Output file extension, if the style produces a bundle
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::App => Some("app"),
            Self::Apk => Some("apk"),
            Self::Tpk => Some("tpk"),
        }
    }
}

impl FromStr for BundleStyle {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "app" => Ok(Self::App),
            "apk" => Ok(Self::Apk),
            "tpk" => Ok(Self::Tpk),
            other => Err(BuildError::InvalidManifest(format!(
                "unknown bundle style '{}'",
                other
            ))),
        }
    }
}

/// Capability row for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    /// Graphics frameworks linked into binaries and bundles
    pub frameworks: Vec<String>,
    /// Graphics libraries linked into binaries and bundles
    pub libs: Vec<String>,
    /// Backends whose sources compile on this platform
    pub backends: Vec<Backend>,
    /// Resource set bound to bundles, if the platform has bundles
    pub resource_set: Option<ResourceSetKind>,
    pub bundle: BundleStyle,
    /// Only a single application can be deployed, so tests aggregate
    pub monolithic: bool,
    /// Developer tools are built for this platform
    pub host_tools: bool,
    /// Even per-case test executables are bundled
    pub bundle_tests: bool,
    /// Bundles must carry an entitlements file
    pub requires_entitlements: bool,
    /// Extra sources the monolithic test bundle needs (relative to the test basepath)
    pub extra_test_sources: Vec<PathBuf>,
}

impl PlatformCapabilities {
    fn new(frameworks: &[&str], libs: &[&str], backends: &[Backend]) -> Self {
        Self {
            frameworks: frameworks.iter().map(|s| s.to_string()).collect(),
            libs: libs.iter().map(|s| s.to_string()).collect(),
            backends: backends.to_vec(),
            resource_set: None,
            bundle: BundleStyle::None,
            monolithic: false,
            host_tools: true,
            bundle_tests: false,
            requires_entitlements: false,
            extra_test_sources: Vec::new(),
        }
    }

    fn bundled(mut self, resource_set: ResourceSetKind, bundle: BundleStyle) -> Self {
        self.resource_set = Some(resource_set);
        self.bundle = bundle;
        self
    }

    fn mobile(mut self, extra_test_sources: &[&str]) -> Self {
        self.monolithic = true;
        self.host_tools = false;
        self.extra_test_sources = extra_test_sources.iter().map(PathBuf::from).collect();
        self
    }

    /// Whether a bundle request on this platform can produce a bundle
    pub fn has_bundles(&self) -> bool {
        self.resource_set.is_some() && self.bundle.extension().is_some()
    }

    pub fn supports_backend(&self, backend: Backend) -> bool {
        self.backends.contains(&backend)
    }

    /// Merge manifest overrides; unset fields keep the current value
    pub fn merge_with_override(&mut self, over: &PlatformOverride) -> BuildResult<()> {
        if let Some(frameworks) = &over.frameworks {
            self.frameworks = frameworks.clone();
        }
        if let Some(libs) = &over.libs {
            self.libs = libs.clone();
        }
        if let Some(backends) = &over.backends {
            self.backends = backends
                .iter()
                .map(|b| b.parse())
                .collect::<BuildResult<Vec<_>>>()?;
        }
        if let Some(resource_set) = &over.resource_set {
            self.resource_set = match resource_set.as_str() {
                "none" => None,
                other => Some(other.parse()?),
            };
        }
        if let Some(bundle) = &over.bundle {
            self.bundle = bundle.parse()?;
        }
        if let Some(monolithic) = over.monolithic {
            self.monolithic = monolithic;
        }
        if let Some(host_tools) = over.host_tools {
            self.host_tools = host_tools;
        }
        if let Some(bundle_tests) = over.bundle_tests {
            self.bundle_tests = bundle_tests;
        }
        if let Some(requires_entitlements) = over.requires_entitlements {
            self.requires_entitlements = requires_entitlements;
        }
        if let Some(extra) = &over.extra_test_sources {
            self.extra_test_sources = extra.clone();
        }
        Ok(())
    }
}

/// Platform → capability row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    rows: BTreeMap<Platform, PlatformCapabilities>,
}

impl CapabilityTable {
    /// The built-in table
    pub fn builtin() -> Self {
        use Backend::*;

        let mut rows = BTreeMap::new();
        rows.insert(Platform::MacOS, {
            let mut row = PlatformCapabilities::new(
                &["Metal", "QuartzCore", "CoreGraphics", "Carbon"],
                &[],
                &[Gl2, Gl4, Metal, Null],
            )
            .bundled(ResourceSetKind::MacOS, BundleStyle::App);
            row.bundle_tests = true;
            row
        });
        rows.insert(
            Platform::Ios,
            PlatformCapabilities::new(
                &["Metal", "QuartzCore", "OpenGLES", "CoreGraphics"],
                &[],
                &[Gles2, Metal, Null],
            )
            .bundled(ResourceSetKind::Ios, BundleStyle::App)
            .mobile(&["all/ios/viewcontroller.m"]),
        );
        rows.insert(
            Platform::Android,
            PlatformCapabilities::new(&[], &["EGL", "GLESv2", "android", "log"], &[Gles2, Null])
                .bundled(ResourceSetKind::Android, BundleStyle::Apk)
                .mobile(&["all/android/java/com/rampantpixels/render/test/TestActivity.java"]),
        );
        rows.insert(
            Platform::Windows,
            PlatformCapabilities::new(
                &[],
                &["vulkan-1", "gdi32", "iphlpapi", "ws2_32"],
                &[Gl2, Gl4, Vulkan, Directx12, Null],
            ),
        );
        rows.insert(
            Platform::Linux,
            PlatformCapabilities::new(
                &[],
                &["vulkan", "Xxf86vm", "Xext", "X11", "GL"],
                &[Gl2, Gl4, Gles2, Vulkan, Null],
            ),
        );
        rows.insert(
            Platform::Tizen,
            PlatformCapabilities::new(&[], &["EGL", "GLESv2"], &[Gles2, Null])
                .bundled(ResourceSetKind::Tizen, BundleStyle::Tpk)
                .mobile(&[]),
        );
        rows.insert(
            Platform::Pnacl,
            PlatformCapabilities::new(&[], &["ppapi", "ppapi_gles2"], &[Gles2, Null]).mobile(&[]),
        );

        Self { rows }
    }

    /// Built-in table with manifest overrides applied
    pub fn with_overrides(overrides: &BTreeMap<String, PlatformOverride>) -> BuildResult<Self> {
        let mut table = Self::builtin();
        for (name, over) in overrides {
            let platform: Platform = name.parse()?;
            table.row_mut(platform).merge_with_override(over)?;
        }
        Ok(table)
    }

    /// Row for a platform
    pub fn get(&self, platform: Platform) -> &PlatformCapabilities {
        // Every platform has a row: builtin() fills all of them and rows are never removed
        &self.rows[&platform]
    }

    fn row_mut(&mut self, platform: Platform) -> &mut PlatformCapabilities {
        self.rows
            .entry(platform)
            .or_insert_with(|| PlatformCapabilities::new(&[], &[], &[Backend::Null]))
    }

    /// Replace a row
    pub fn set(&mut self, platform: Platform, capabilities: PlatformCapabilities) {
        self.rows.insert(platform, capabilities);
    }

    /// Iterate rows in platform order
    pub fn iter(&self) -> impl Iterator<Item = (&Platform, &PlatformCapabilities)> {
        self.rows.iter()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::builtin()
    }
}
