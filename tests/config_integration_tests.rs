//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Defaults when no configuration file exists
//! - Configuration saving and loading
//! - Partially written files falling back to defaults per field

use camino::Utf8PathBuf;
use icon_pipeline::{ConfigManager, PipelineConfig};
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    assert_eq!(manager.config_dir(), &config_path);
    assert_eq!(manager.config_path(), &config_path.join("icon-pipeline.yaml"));
}

#[test]
fn test_load_default_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    let config = manager.load_config().unwrap();

    assert_eq!(config.index.source_dir, "external/icons/src/icons");
    assert_eq!(config.index.output_dir, "icons");
    assert_eq!(config.render.source_dir, "external/icons/icons");
    assert_eq!(config.render.size, 32);
    assert_eq!(config.render.max_concurrency, 18);
}

#[test]
fn test_save_creates_missing_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("conf").join("pipeline");
    let manager = ConfigManager::new(&nested);

    manager.save_config(&PipelineConfig::default()).unwrap();

    assert!(nested.join("icon-pipeline.yaml").exists());
}

#[test]
fn test_save_and_load_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    let mut config = manager.load_config().unwrap();
    config.render.size = 48;
    config.render.max_concurrency = 4;
    config.index.marker = "entries:".to_string();
    manager.save_config(&config).unwrap();

    let loaded = manager.load_config().unwrap();
    assert_eq!(loaded.render.size, 48);
    assert_eq!(loaded.render.max_concurrency, 4);
    assert_eq!(loaded.index.marker, "entries:");
}

#[test]
fn test_handwritten_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path);

    let content = r#"
Index:
  Source Dir: "vendor/material-icons/src/icons"
Render:
  Dest Dir: "assets/icons"
  Tool: "/usr/local/bin/inkscape"
  Max Concurrency: 8
"#;
    fs::write(manager.config_path(), content).unwrap();

    let config = manager.load_config().unwrap();

    assert_eq!(config.index.source_dir, "vendor/material-icons/src/icons");
    assert_eq!(config.index.output_dir, "icons");
    assert_eq!(config.render.dest_dir, "assets/icons");
    assert_eq!(config.render.tool, "/usr/local/bin/inkscape");
    assert_eq!(config.render.max_concurrency, 8);
    assert_eq!(config.render.dest_ext, "png");
}
