//! Target descriptor
//!
//! Identifies the platform a build is configured for and answers capability
//! queries about it. A `Target` is resolved once per configuration run and
//! never mutated afterwards.

use crate::capability::PlatformCapabilities;
use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOS,
    Ios,
    Android,
    Windows,
    Linux,
    Tizen,
    Pnacl,
}

impl Platform {
    /// All known platforms
    pub const ALL: [Platform; 7] = [
        Self::MacOS,
        Self::Ios,
        Self::Android,
        Self::Windows,
        Self::Linux,
        Self::Tizen,
        Self::Pnacl,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::MacOS => "macos",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Tizen => "tizen",
            Self::Pnacl => "pnacl",
        }
    }

    /// The platform this process runs on
    pub fn host() -> BuildResult<Self> {
        match std::env::consts::OS {
            "macos" => Ok(Self::MacOS),
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            other => Err(BuildError::UnknownPlatform(other.to_string())),
        }
    }

    /// File name of a static library built for this platform
    pub fn library_filename(&self, name: &str) -> String {
        match self {
            Self::Windows => format!("{}.lib", name),
            _ => format!("lib{}.a", name),
        }
    }

    /// File name of an executable built for this platform
    pub fn binary_filename(&self, name: &str) -> String {
        match self {
            Self::Windows => format!("{}.exe", name),
            Self::Pnacl => format!("{}.pexe", name),
            _ => name.to_string(),
        }
    }
}

impl FromStr for Platform {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macos" | "macosx" | "osx" => Ok(Self::MacOS),
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "windows" | "win32" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "tizen" => Ok(Self::Tizen),
            "pnacl" => Ok(Self::Pnacl),
            _ => Err(BuildError::UnknownPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved build target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    platform: Platform,
    monolithic_preferred: bool,
}

impl Target {
    /// Resolve a target from its platform capability row and the toolchain preference
    pub fn new(
        platform: Platform,
        capabilities: &PlatformCapabilities,
        toolchain_monolithic: bool,
    ) -> Self {
        Self {
            platform,
            monolithic_preferred: capabilities.monolithic || toolchain_monolithic,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_macos(&self) -> bool {
        self.platform == Platform::MacOS
    }

    pub fn is_ios(&self) -> bool {
        self.platform == Platform::Ios
    }

    pub fn is_android(&self) -> bool {
        self.platform == Platform::Android
    }

    pub fn is_windows(&self) -> bool {
        self.platform == Platform::Windows
    }

    pub fn is_linux(&self) -> bool {
        self.platform == Platform::Linux
    }

    pub fn is_tizen(&self) -> bool {
        self.platform == Platform::Tizen
    }

    pub fn is_pnacl(&self) -> bool {
        self.platform == Platform::Pnacl
    }

    /// Whether tests must be aggregated into one fat binary
    ///
    /// True for platforms that only run a single application, and on any
    /// platform when the toolchain builds a single binary.
    pub fn is_monolithic_preferred(&self) -> bool {
        self.monolithic_preferred
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.monolithic_preferred {
            write!(f, "{} (monolithic)", self.platform)
        } else {
            write!(f, "{}", self.platform)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTable;

    fn target(platform: Platform, toolchain_monolithic: bool) -> Target {
        let table = CapabilityTable::builtin();
        Target::new(platform, table.get(platform), toolchain_monolithic)
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::MacOS);
        assert_eq!("MacOSX".parse::<Platform>().unwrap(), Platform::MacOS);
        assert_eq!("windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!(" pnacl ".parse::<Platform>().unwrap(), Platform::Pnacl);
    }

    #[test]
    fn test_unknown_platform() {
        match "beos".parse::<Platform>() {
            Err(BuildError::UnknownPlatform(name)) => assert_eq!(name, "beos"),
            other => panic!("Expected UnknownPlatform, got {:?}", other),
        }
    }

    #[test]
    fn test_platform_name_round_trips() {
        for platform in Platform::ALL {
            assert_eq!(platform.name().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_predicates_are_mutually_exclusive() {
        for platform in Platform::ALL {
            let t = target(platform, false);
            let matches = [
                t.is_macos(),
                t.is_ios(),
                t.is_android(),
                t.is_windows(),
                t.is_linux(),
                t.is_tizen(),
                t.is_pnacl(),
            ];
            assert_eq!(matches.iter().filter(|m| **m).count(), 1, "{}", platform);
        }
    }

    #[test]
    fn test_mobile_targets_prefer_monolithic() {
        assert!(target(Platform::Ios, false).is_monolithic_preferred());
        assert!(target(Platform::Android, false).is_monolithic_preferred());
        assert!(target(Platform::Tizen, false).is_monolithic_preferred());
        assert!(target(Platform::Pnacl, false).is_monolithic_preferred());
        assert!(!target(Platform::Linux, false).is_monolithic_preferred());
        assert!(!target(Platform::MacOS, false).is_monolithic_preferred());
    }

    #[test]
    fn test_toolchain_forces_monolithic_on_desktop() {
        let t = target(Platform::Windows, true);
        assert!(t.is_windows());
        assert!(t.is_monolithic_preferred());
    }

    #[test]
    fn test_output_filenames() {
        assert_eq!(Platform::Windows.library_filename("render"), "render.lib");
        assert_eq!(Platform::Linux.library_filename("render"), "librender.a");
        assert_eq!(Platform::Windows.binary_filename("renderimport"), "renderimport.exe");
        assert_eq!(Platform::MacOS.binary_filename("renderimport"), "renderimport");
    }
}
