//! Integration tests for configuration loading and path resolution
//!
//! Tests that manipulate DOST_CONFIG or DOST_TREE_PATH are marked #[serial]
//! so they never race each other on the process environment.

use dost_common::config::{
    load_config, resolve_config_path, resolve_tree_path, TomlConfig, CONFIG_ENV_VAR,
    TREE_PATH_ENV_VAR,
};
use dost_common::{Error, TaskType};
use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
tree_path = "/srv/dost/curriculum.json"
student_id = "65fc118510a22c2009134989"

[logging]
level = "debug"

[resolver]
chapter_cutoff = 0.75

[validation]
max_retries = 3
endpoint = "http://localhost:8080/validate"

[aggregation]
merge_policy = "by-subject"

[dispatch]
base_url = "https://api.example.test"

[params.revision]
allotedDay = 5

[params.practiceAssignment]
difficulty = "medium"
"#;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_config_parses() {
    let config = TomlConfig::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.tree_path, Some(PathBuf::from("/srv/dost/curriculum.json")));
    assert_eq!(config.student_id.as_deref(), Some("65fc118510a22c2009134989"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.resolver.chapter_cutoff, 0.75);
    assert_eq!(config.resolver.concept_cutoff, 0.7);
    assert_eq!(config.validation.max_retries, 3);
    assert_eq!(config.aggregation.merge_policy, "by-subject");
    assert_eq!(config.dispatch.base_url.as_deref(), Some("https://api.example.test"));
}

#[test]
fn test_param_overrides_flow_into_table() {
    let config = TomlConfig::from_toml_str(FULL_CONFIG).unwrap();
    let table = config.param_table().unwrap();

    assert_eq!(table.get(TaskType::Revision).defaults["allotedDay"], json!(5));
    assert_eq!(
        table.get(TaskType::PracticeAssignment).defaults["difficulty"],
        json!("medium")
    );
    // Untouched defaults survive
    assert_eq!(table.get(TaskType::Revision).defaults["strategy"], json!(1));
}

#[test]
#[serial]
fn test_cli_path_beats_environment() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "");
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/env.toml");

    let resolved = resolve_config_path(Some(&cli));

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(cli));
}

#[test]
#[serial]
fn test_environment_path_used_when_no_cli() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "student_id = \"env-student\"");
    env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(config.unwrap().student_id.as_deref(), Some("env-student"));
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let err = load_config(Some(Path::new("/nonexistent/dost.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[resolver\nchapter_cutoff = ");
    env::remove_var(CONFIG_ENV_VAR);

    assert!(load_config(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_tree_path_priority() {
    let config = TomlConfig {
        tree_path: Some(PathBuf::from("/from/toml.json")),
        ..Default::default()
    };

    env::remove_var(TREE_PATH_ENV_VAR);
    assert_eq!(
        resolve_tree_path(None, &config).unwrap(),
        PathBuf::from("/from/toml.json")
    );

    env::set_var(TREE_PATH_ENV_VAR, "/from/env.json");
    assert_eq!(
        resolve_tree_path(None, &config).unwrap(),
        PathBuf::from("/from/env.json")
    );
    assert_eq!(
        resolve_tree_path(Some(Path::new("/from/cli.json")), &config).unwrap(),
        PathBuf::from("/from/cli.json")
    );
    env::remove_var(TREE_PATH_ENV_VAR);
}

#[test]
#[serial]
fn test_tree_path_missing_everywhere() {
    env::remove_var(TREE_PATH_ENV_VAR);
    let err = resolve_tree_path(None, &TomlConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("--tree")));
}
