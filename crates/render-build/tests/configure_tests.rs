//! Configuration run integration tests
//!
//! End-to-end planning of a render project manifest for each platform

use pretty_assertions::assert_eq;
use render_build::{
    ArtifactKind, ArtifactRole, BuildError, Configuration, Configurator, OutputFormat, Platform,
};
use render_config::{Config, ConfigLoader, MANIFEST_FILE};
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RENDER_MANIFEST: &str = r#"
[project]
name = "render"
dependlibs = ["resource", "window", "foundation"]

[library]
sources = ["render.c", "backend.c", "null/backend.c"]

[[library.conditional]]
backend = "vulkan"
sources = ["vulkan/backend.c"]

[[library.conditional]]
backend = "metal"
sources = ["metal/backend.m"]

[[library.conditional]]
backend = "gles2"
sources = ["gles2/backend.c"]

[[tool]]
name = "renderimport"
sources = ["main.c", "glsl.c", "shader.c", "program.c"]

[[tool]]
name = "rendercompile"
sources = ["main.c"]

[tests]
cases = ["render"]

[tests.resources.ios]
files = ["all/ios/test-all.plist", "all/ios/Images.xcassets", "all/ios/test-all.xib"]

[tests.resources.macos]
files = ["all/macos/test-all.plist", "all/macos/test-all.xib"]

[tests.resources.android]
files = ["all/android/AndroidManifest.xml"]
"#;

/// Create a project directory holding the render manifest
fn create_project(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
    dir
}

/// Load with a fixed environment so host variables never leak in
fn load(dir: &Path, vulkan_sdk: Option<&'static str>) -> Config {
    ConfigLoader::with_env(move |name| match name {
        "VULKAN_SDK" => vulkan_sdk.map(str::to_string),
        _ => None,
    })
    .load_from_directory(dir)
    .unwrap()
}

fn configure(platform: Platform, configs: &[&str]) -> Configuration {
    let project = create_project(RENDER_MANIFEST);
    Configurator::from_config(load(project.path(), None))
        .with_platform(platform)
        .with_configs(configs.iter().map(|c| c.to_string()).collect())
        .configure()
        .unwrap()
}

fn names_with_role(configuration: &Configuration, role: ArtifactRole) -> Vec<String> {
    configuration
        .graph()
        .iter()
        .filter(|a| a.role() == role)
        .map(|a| a.name().to_string())
        .collect()
}

// ============================================================================
// Platform scenarios
// ============================================================================

#[test]
fn test_windows_plans_tools() {
    let configuration = configure(Platform::Windows, &["debug", "release"]);
    let graph = configuration.graph();

    assert_eq!(
        names_with_role(&configuration, ArtifactRole::Tool),
        vec!["renderimport", "rendercompile"]
    );
    for name in ["renderimport", "rendercompile"] {
        let tool = graph.get(name).unwrap();
        assert_eq!(tool.kind(), ArtifactKind::Binary);
        assert_eq!(tool.implicit_deps(), &["render".to_string()]);
        for lib in ["gdi32", "iphlpapi", "ws2_32"] {
            assert!(tool.common().libs.iter().any(|l| l == lib), "{} missing {}", name, lib);
        }
    }

    let render = graph.get("render").unwrap();
    assert!(render
        .common()
        .sources
        .contains(&PathBuf::from("render/vulkan/backend.c")));
    assert!(!render
        .common()
        .sources
        .contains(&PathBuf::from("render/metal/backend.m")));
}

#[test]
fn test_ios_plans_single_bundle() {
    let configuration = configure(Platform::Ios, &["debug", "release"]);
    let graph = configuration.graph();

    assert!(configuration.context().target.is_monolithic_preferred());
    assert_eq!(names_with_role(&configuration, ArtifactRole::Test), vec!["test-all"]);
    assert!(names_with_role(&configuration, ArtifactRole::Tool).is_empty());

    let all = graph.get("test-all").unwrap();
    assert_eq!(all.kind(), ArtifactKind::AppBundle);
    assert_eq!(
        all.resources(),
        vec![
            PathBuf::from("test/all/ios/test-all.plist"),
            PathBuf::from("test/all/ios/Images.xcassets"),
            PathBuf::from("test/all/ios/test-all.xib"),
        ]
    );
    assert_eq!(
        all.common().sources.last(),
        Some(&PathBuf::from("test/all/ios/viewcontroller.m"))
    );
    assert_eq!(all.implicit_deps(), &["render".to_string()]);
}

#[test]
fn test_linux_without_tool_configs() {
    let configuration = configure(Platform::Linux, &["profile", "deploy"]);

    assert!(names_with_role(&configuration, ArtifactRole::Tool).is_empty());
    assert_eq!(
        names_with_role(&configuration, ArtifactRole::Test),
        vec!["test-render", "test-all"]
    );
}

#[test]
fn test_absent_sdk_still_emits() {
    let project = create_project(RENDER_MANIFEST);
    let configuration = Configurator::from_config(load(project.path(), None))
        .with_platform(Platform::Linux)
        .configure()
        .unwrap();

    for artifact in configuration.graph().iter() {
        assert!(artifact.common().include_paths.is_empty());
        assert!(artifact.common().lib_paths.is_empty());
    }

    let file = configuration.emit().unwrap();
    let path = project.path().join("build.ninja");
    assert!(file.write_atomic(&path, OutputFormat::Ninja).unwrap());
    assert!(fs::read_to_string(&path).unwrap().contains("build lib/librender.a: lib"));
}

#[test]
fn test_present_sdk_adds_paths() {
    let project = create_project(RENDER_MANIFEST);
    let configuration = Configurator::from_config(load(project.path(), Some("/opt/vulkan")))
        .with_platform(Platform::Linux)
        .configure()
        .unwrap();

    let render = configuration.graph().get("render").unwrap();
    assert_eq!(
        render.common().include_paths,
        vec![PathBuf::from("/opt/vulkan/include")]
    );
    assert_eq!(render.common().lib_paths, vec![PathBuf::from("/opt/vulkan/lib")]);
}

// ============================================================================
// Test suite invariants
// ============================================================================

#[rstest]
#[case(Platform::MacOS)]
#[case(Platform::Windows)]
#[case(Platform::Linux)]
fn test_per_case_count(#[case] platform: Platform) {
    let configuration = configure(platform, &["debug"]);
    let tests = names_with_role(&configuration, ArtifactRole::Test);
    assert_eq!(tests.len(), 1 + 1);
    assert_eq!(tests.last().map(String::as_str), Some("test-all"));
}

#[rstest]
#[case(Platform::Ios, ArtifactKind::AppBundle)]
#[case(Platform::Android, ArtifactKind::AppBundle)]
#[case(Platform::Tizen, ArtifactKind::Binary)]
#[case(Platform::Pnacl, ArtifactKind::Binary)]
fn test_monolithic_single_artifact(#[case] platform: Platform, #[case] kind: ArtifactKind) {
    let configuration = configure(platform, &["debug"]);
    assert_eq!(names_with_role(&configuration, ArtifactRole::Test), vec!["test-all"]);
    assert_eq!(configuration.graph().get("test-all").unwrap().kind(), kind);
}

#[test]
fn test_macos_case_bundles_reuse_suite_resources() {
    let configuration = configure(Platform::MacOS, &["debug"]);
    let case = configuration.graph().get("test-render").unwrap();
    assert_eq!(case.kind(), ArtifactKind::AppBundle);
    assert_eq!(case.resources().len(), 2);
    assert!(case.common().frameworks.contains(&"Carbon".to_string()));
}

#[test]
fn test_tests_link_render_library() {
    let configuration = configure(Platform::Linux, &["debug"]);
    for name in ["test-render", "test-all"] {
        let test = configuration.graph().get(name).unwrap();
        assert_eq!(
            &test.common().libs[..5],
            &["test", "render", "resource", "window", "foundation"]
        );
        assert_eq!(test.implicit_deps(), &["render".to_string()]);
    }
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn test_emit_is_idempotent() {
    let configuration = configure(Platform::Windows, &["debug", "release"]);
    let first = configuration.emit().unwrap();
    let second = configuration.emit().unwrap();
    assert_eq!(first.to_ninja(), second.to_ninja());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_emit_orders_library_first() {
    let configuration = configure(Platform::Windows, &["debug", "release"]);
    let file = configuration.emit().unwrap();
    assert_eq!(file.rules[0].name, "render");
    assert_eq!(file.edges.len(), configuration.stats().edges);
    assert_eq!(file.rule("renderimport").unwrap().configs, vec!["debug", "release"]);
}

#[test]
fn test_nested_exports_library_only() {
    let project = create_project(RENDER_MANIFEST);
    let configuration = Configurator::from_config(load(project.path(), None))
        .with_platform(Platform::Windows)
        .with_nested(true)
        .configure()
        .unwrap();

    assert_eq!(configuration.exported_libraries(), vec!["render"]);
    let file = configuration.emit().unwrap();
    assert_eq!(file.rules.len(), 1);
    assert!(file.edges.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_platform_override_fails() {
    let manifest = format!("{}\n[platforms.beos]\nlibs = [\"be\"]\n", RENDER_MANIFEST);
    let project = create_project(&manifest);
    let result = Configurator::from_config(load(project.path(), None))
        .with_platform(Platform::Linux)
        .configure();
    assert!(matches!(result, Err(BuildError::UnknownPlatform(_))));
}

#[test]
fn test_tool_named_like_library_is_duplicate() {
    let manifest = format!(
        "{}\n[[tool]]\nname = \"render\"\nsources = [\"main.c\"]\n",
        RENDER_MANIFEST
    );
    let project = create_project(&manifest);
    let result = Configurator::from_config(load(project.path(), None))
        .with_platform(Platform::Linux)
        .configure();
    assert!(matches!(result, Err(BuildError::DuplicateArtifact { .. })));
}

#[test]
fn test_missing_manifest() {
    let dir = TempDir::new().unwrap();
    let result = Configurator::new(dir.path());
    assert!(matches!(result, Err(BuildError::Config(_))));
}

// ============================================================================
// Demo manifest
// ============================================================================

#[rstest]
#[case(Platform::Linux, true)]
#[case(Platform::Windows, true)]
#[case(Platform::Android, false)]
fn test_demo_manifest_plans_gl2(#[case] platform: Platform, #[case] has_gl2: bool) {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/render/rendergen.toml");
    let config = ConfigLoader::with_env(|_| None)
        .load_from_file(&manifest)
        .unwrap();
    let configuration = Configurator::from_config(config)
        .with_platform(platform)
        .configure()
        .unwrap();

    let render = configuration.graph().get("render").unwrap();
    assert_eq!(
        render
            .common()
            .sources
            .contains(&PathBuf::from("render/gl2/backend.c")),
        has_gl2
    );
}
