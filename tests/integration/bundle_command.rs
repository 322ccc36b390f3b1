//! Integration tests for `starter bundle`.

use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, rails_catalog};
use starter_bundle::test_utils::CatalogFixture;

const CONTEXT: &str = r#"
services:
  - name: web
    env_vars:
      RAILS_ENV: production
      PORT: "3000"
  - name: worker
databases:
  - name: postgresql
  - name: mongodb
"#;

#[test]
fn test_bundle_from_configured_pack() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();
    project.write_config("rails", Some("https://github.com/example/rails.git")).unwrap();
    let context = project.write_file("project.yml", CONTEXT).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "rails", "--context"])
        .arg(&context)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundle with 3 stencil(s) saved to"));

    let bundle = project.bundle_path();
    for folder in
        ["stencils", "policies", "transformations", "stencil_groups", "helm_releases", "configurations"]
    {
        assert!(bundle.join(folder).is_dir(), "missing {folder}");
    }

    assert_eq!(
        fs::read_to_string(bundle.join("stencils/web_service.yml")).unwrap(),
        "# stencil service\n"
    );
    assert!(bundle.join("stencils/worker_service.yml").is_file());
    assert!(bundle.join("stencils/procfile.yml").is_file());
    assert!(!bundle.join("stencils/lonely.yml").exists());
    assert_eq!(
        fs::read_to_string(bundle.join("configurations/rails-config")).unwrap(),
        "PORT=3000\nRAILS_ENV=production\n"
    );

    let manifest = project.manifest_json();
    assert_eq!(manifest["name"], "starter-formation");
    assert_eq!(manifest["configuration"], serde_json::json!(["rails-config"]));
    assert_eq!(manifest["metadata"]["app"], "starter");

    let base = &manifest["base_templates"][0];
    assert_eq!(base["name"], "rails");
    assert_eq!(base["repo"], "https://github.com/example/rails.git");
    assert_eq!(base["branch"], "master");

    let stencils = base["stencils"].as_array().unwrap();
    let filenames: Vec<&str> = stencils.iter().map(|s| s["filename"].as_str().unwrap()).collect();
    assert_eq!(filenames, ["web_service.yml", "worker_service.yml", "procfile.yml"]);
    assert_eq!(stencils[1]["context_id"], "worker");
    assert_eq!(stencils[2]["context_id"], "");

    let policies = manifest["policies"].as_array().unwrap();
    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0]["name"], "quota");
    assert_eq!(manifest["transformations"], serde_json::json!([]));

    let releases: Vec<&str> = manifest["helm_releases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["chart_name"].as_str().unwrap())
        .collect();
    assert_eq!(releases, ["postgresql", "redis"]);
}

#[test]
fn test_bundle_with_repository_flag_and_services() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "rails", "--service", "api", "--branch", "develop"])
        .arg("--repository")
        .arg(project.templates_path())
        .assert()
        .success();

    let manifest = project.manifest_json();
    let base = &manifest["base_templates"][0];
    assert_eq!(base["branch"], "develop");
    assert_eq!(base["stencils"][0]["filename"], "api_service.yml");
    assert!(project.bundle_path().join("configurations/rails-config").is_file());
}

#[test]
fn test_unknown_pack_writes_nothing() {
    let project = TestProject::new().unwrap();
    project.write_config("rails", None).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "cobol"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stencil template is defined for 'cobol'"));

    assert!(!project.bundle_path().exists());
}

#[test]
fn test_existing_bundle_needs_force() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();
    project.write_config("rails", None).unwrap();

    project.starter().args(["bundle", "--pack", "rails", "--service", "web"]).assert().success();

    project
        .starter()
        .args(["bundle", "--pack", "rails", "--service", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bundle already exists"));

    project
        .starter()
        .args(["bundle", "--pack", "rails", "--service", "other", "--force"])
        .assert()
        .success();
    assert!(project.bundle_path().join("stencils/other_service.yml").is_file());
    assert!(!project.bundle_path().join("stencils/web_service.yml").exists());
}

#[test]
fn test_unresolved_dependency_fails_without_bundle() {
    let project = TestProject::new().unwrap();
    let catalog = CatalogFixture::new()
        .named("node")
        .stencil("app", 1, &["stencils/dockerfil"])
        .stencil("dockerfile", 0, &[]);
    project.write_templates(&catalog).unwrap();
    project.write_config("node", None).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "node"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dockerfil"));

    let leftovers: Vec<_> = fs::read_dir(project.output_path()).unwrap().collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn test_missing_stencil_file_fails() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();
    project.write_config("rails", None).unwrap();
    fs::remove_file(project.templates_path().join("stencils/procfile.yml")).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "rails", "--service", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("procfile.yml"));

    assert!(!project.bundle_path().exists());
}

#[test]
fn test_cycles_warn_or_fail() {
    let project = TestProject::new().unwrap();
    let catalog = CatalogFixture::new()
        .named("go")
        .stencil("a", 1, &["stencils/b"])
        .stencil("b", 0, &["stencils/a"]);
    project.write_templates(&catalog).unwrap();
    project.write_config("go", None).unwrap();

    project
        .starter()
        .args(["bundle", "--pack", "go", "--deny-cycles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency"));
    assert!(!project.bundle_path().exists());

    project
        .starter()
        .args(["bundle", "--pack", "go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("circular dependency for 'stencils/a'"));
    assert!(project.bundle_path().join("stencils/a.yml").is_file());
    assert!(project.bundle_path().join("stencils/b.yml").is_file());
}
