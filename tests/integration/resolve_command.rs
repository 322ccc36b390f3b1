//! Integration tests for `starter resolve`.

use predicates::prelude::*;

use crate::common::{TestProject, rails_catalog};
use starter_bundle::test_utils::CatalogFixture;

fn catalog_arg(project: &TestProject) -> String {
    project.templates_path().join("templates.json").display().to_string()
}

#[test]
fn test_resolve_lists_required_units() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project)])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 required unit(s) from 1 root(s)"))
        .stdout(predicate::str::contains("helm_charts:\n  redis"))
        .stdout(predicate::str::contains("lonely").not());
}

#[test]
fn test_resolve_json() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();

    let output = project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["roots"], serde_json::json!(["stencils/service"]));
    assert_eq!(
        json["required"],
        serde_json::json!([
            "stencils/procfile",
            "stencils/service",
            "policies/quota",
            "helm_charts/redis"
        ])
    );
    assert_eq!(json["cycles"], serde_json::json!([]));
}

#[test]
fn test_resolve_tree_marks_cycles() {
    let project = TestProject::new().unwrap();
    let catalog = CatalogFixture::new()
        .stencil("a", 1, &["stencils/b", "policies/p"])
        .stencil("b", 0, &["stencils/a"])
        .policy("p", &[]);
    project.write_templates(&catalog).unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project), "--tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "stencils/a\n├── stencils/b\n│   └── stencils/a (circular reference)\n└── policies/p\n",
        ))
        .stdout(predicate::str::contains("warning:"));
}

#[test]
fn test_resolve_explicit_root() {
    let project = TestProject::new().unwrap();
    project.write_templates(&rails_catalog()).unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project), "--root", "stencils/procfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 required unit(s) from 1 root(s)"));
}

#[test]
fn test_resolve_unknown_reference_suggests() {
    let project = TestProject::new().unwrap();
    let catalog = CatalogFixture::new()
        .stencil("web", 1, &["stencils/dockerfil"])
        .stencil("dockerfile", 0, &[]);
    project.write_templates(&catalog).unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find dependency with name"))
        .stderr(predicate::str::contains("dockerfile"));
}

#[test]
fn test_resolve_deny_cycles() {
    let project = TestProject::new().unwrap();
    let catalog = CatalogFixture::new().stencil("self", 1, &["stencils/self"]);
    project.write_templates(&catalog).unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", &catalog_arg(&project), "--deny-cycles"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency for 'stencils/self'"));
}

#[test]
fn test_resolve_missing_catalog() {
    let project = TestProject::new().unwrap();

    project
        .starter()
        .args(["resolve", "--catalog", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}
