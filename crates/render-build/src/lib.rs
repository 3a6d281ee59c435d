//! Render build planner
//!
//! Turns the declarative render project into a concrete build graph for one
//! target platform, including:
//! - Target resolution and the per-platform capability table
//! - Conditional source resolution per platform and backend
//! - Library, tool and test artifact assembly (binaries or app bundles)
//! - An acyclic dependency graph with deterministic ordering
//! - Ninja or JSON build file emission with atomic writes
//!
//! # Example
//!
//! ```no_run
//! use render_build::{Configurator, Platform};
//!
//! let configuration = Configurator::new(".")?
//!     .with_platform(Platform::Linux)
//!     .configure()?;
//! let build_file = configuration.emit()?;
//! println!("{}", build_file.to_ninja());
//! # Ok::<(), render_build::BuildError>(())
//! ```

pub mod artifact;
pub mod assembler;
pub mod capability;
pub mod configure;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod module;
pub mod target;
pub mod test_plan;
pub mod toolchain;

// Re-export main types
pub use artifact::{ArtifactCommon, ArtifactKind, ArtifactRole, ArtifactSpec, BundleResources};
pub use assembler::{ArtifactAssembler, ResourceSet, ResourceSets};
pub use capability::{Backend, BundleStyle, CapabilityTable, PlatformCapabilities, ResourceSetKind};
pub use configure::{Configuration, ConfigureContext, ConfigureStats, Configurator};
pub use emitter::{
    write_atomic, BuildEdge, BuildFile, BuildGraphEmitter, BuildRule, EmitOptions, OutputFormat,
};
pub use error::{BuildError, BuildResult};
pub use graph::{AppBundleNode, BinaryNode, DependencyGraph, LibraryNode, NodeRef};
pub use module::{Condition, ConditionalSources, ModuleSpec};
pub use target::{Platform, Target};
pub use test_plan::{PlannerMode, TestCaseSet, TestSuitePlanner};
pub use toolchain::{BuildConfig, ToolchainConfigSet};
