//! Manifest loading and environment precedence tests

use pretty_assertions::assert_eq;
use render_config::{ConfigError, ConfigLoader, ProjectConfig, MANIFEST_FILE};
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join(MANIFEST_FILE);
    fs::write(&config_path, content).unwrap();
    config_path
}

const RENDER_MANIFEST: &str = r#"
[project]
name = "render"
dependlibs = ["resource", "window", "foundation"]

[library]
sources = ["backend.c", "render.c"]

[[library.conditional]]
backend = "vulkan"
sources = ["vulkan/backend.c"]

[[library.conditional]]
platforms = ["macos", "ios"]
sources = ["metal/backend.m"]

[[tool]]
name = "renderimport"
sources = ["main.c", "glsl.c"]

[[tool]]
name = "rendercompile"
sources = ["main.c"]

[tests]
cases = ["render"]

[tests.resources.ios]
files = ["all/ios/test-all.plist", "all/ios/Images.xcassets", "all/ios/test-all.xib"]

[toolchain]
configs = ["debug", "release", "profile", "deploy"]

[platforms.linux]
libs = ["vulkan", "X11", "GL"]

[sdk.vulkan]
variable = "VULKAN_SDK"
"#;

// ============================================================================
// Manifest Loading
// ============================================================================

#[test]
fn test_load_full_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), RENDER_MANIFEST);

    let config = ProjectConfig::load_from_file(&path).unwrap();

    assert_eq!(config.project_name(), Some("render"));
    assert_eq!(config.library_name(), Some("render"));
    assert_eq!(config.dependlibs().len(), 3);
    assert_eq!(config.tools.len(), 2);
    assert_eq!(config.tools[0].name, "renderimport");

    let library = config.library.as_ref().unwrap();
    assert_eq!(library.conditional.len(), 2);
    assert_eq!(library.conditional[0].backend.as_deref(), Some("vulkan"));

    let tests = config.tests.as_ref().unwrap();
    assert_eq!(tests.cases, vec!["render".to_string()]);
    assert_eq!(tests.resources["ios"].files.len(), 3);

    assert_eq!(
        config.platforms["linux"].libs,
        Some(vec!["vulkan".to_string(), "X11".to_string(), "GL".to_string()])
    );
}

#[test]
fn test_missing_manifest_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ProjectConfig::load_from_file(&temp_dir.path().join(MANIFEST_FILE));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_invalid_toml_reports_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[project\nname = ");

    match ProjectConfig::load_from_file(&path) {
        Err(ConfigError::TomlParseError { file, .. }) => assert_eq!(file, path),
        other => panic!("Expected TomlParseError, got {:?}", other),
    }
}

#[rstest]
#[case("[project]\nname = \"\"")]
#[case("[library]\nname = \"\"\nsources = []")]
#[case("[[tool]]\nname = \"\"\nsources = []")]
#[case("[tests]\ncases = [\"render\", \"render\"]")]
#[case("[sdk.vulkan]\nvariable = \"\"")]
fn test_invalid_manifests_rejected(#[case] content: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), content);
    assert!(matches!(
        ProjectConfig::load_from_file(&path),
        Err(ConfigError::InvalidValue { .. })
    ));
}

// ============================================================================
// Process Environment
// ============================================================================

#[test]
#[serial]
fn test_process_env_sdk_absent() {
    env::remove_var("VULKAN_SDK");
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), RENDER_MANIFEST);

    let config = ConfigLoader::new()
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(config.hints.include_paths().is_empty());
    assert!(config.hints.lib_paths().is_empty());
}

#[test]
#[serial]
fn test_process_env_sdk_present() {
    env::set_var("VULKAN_SDK", "/opt/vulkan-sdk");
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), RENDER_MANIFEST);

    let config = ConfigLoader::new()
        .load_from_directory(temp_dir.path())
        .unwrap();
    env::remove_var("VULKAN_SDK");

    assert_eq!(
        config.hints.include_paths(),
        vec![PathBuf::from("/opt/vulkan-sdk/include")]
    );
    assert_eq!(
        config.hints.lib_paths(),
        vec![PathBuf::from("/opt/vulkan-sdk/lib")]
    );
}

#[test]
#[serial]
fn test_process_env_overrides_manifest_configs() {
    env::set_var("RENDER_CONFIGS", "debug");
    env::set_var("RENDER_TOOLCHAIN_MONOLITHIC", "true");
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), RENDER_MANIFEST);

    let config = ConfigLoader::new()
        .load_from_directory(temp_dir.path())
        .unwrap();
    env::remove_var("RENDER_CONFIGS");
    env::remove_var("RENDER_TOOLCHAIN_MONOLITHIC");

    assert_eq!(config.configs(), Some(&["debug".to_string()][..]));
    assert!(config.toolchain_monolithic());
}
