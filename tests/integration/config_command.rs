//! Integration tests for `starter config`.

use predicates::prelude::*;

use crate::common::TestProject;
use starter_bundle::config::StarterConfig;

#[test]
fn test_config_path_from_env() {
    let project = TestProject::new().unwrap();

    project
        .starter()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(project.config_path().display().to_string()));
}

#[test]
fn test_config_flag_overrides_env() {
    let project = TestProject::new().unwrap();
    let other = project.output_path().join("other.toml");

    project
        .starter()
        .args(["config", "path", "--config"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("other.toml"));
}

#[tokio::test]
async fn test_config_init_then_show() {
    let project = TestProject::new().unwrap();

    project
        .starter()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let written = StarterConfig::load_from(project.config_path()).await.unwrap();
    assert_eq!(written, StarterConfig::init_example());

    project
        .starter()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    project
        .starter()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[packs.rails]"));
}

#[test]
fn test_config_show_without_file() {
    let project = TestProject::new().unwrap();

    project
        .starter()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("No template sources configured."));
}

#[test]
fn test_invalid_config_is_reported() {
    let project = TestProject::new().unwrap();
    std::fs::create_dir_all(project.config_path().parent().unwrap()).unwrap();
    std::fs::write(project.config_path(), "packs = 3").unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "rails"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse starter config"));
}
