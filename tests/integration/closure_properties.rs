//! Resolver behaviour over whole catalogs.

use std::collections::BTreeSet;

use starter_bundle::catalog::Catalog;
use starter_bundle::core::{QualifiedName, UnitKind};
use starter_bundle::resolver::{
    DependencyGraph, compute_required_closure, initial_unit_names, resolve_catalog,
    select_required,
};
use starter_bundle::test_utils::CatalogFixture;

/// A layered catalog: every stencil `s{i}` depends on `s{2i+1}` and
/// `s{2i+2}` when they exist, plus one policy per even stencil.
fn layered_catalog(size: usize) -> Catalog {
    let mut fixture = CatalogFixture::new().named("layered");
    for i in 0..size {
        let left = format!("stencils/s{}", 2 * i + 1);
        let right = format!("stencils/s{}", 2 * i + 2);
        let policy = format!("policies/p{i}");
        let mut deps: Vec<&str> = Vec::new();
        if 2 * i + 1 < size {
            deps.push(&left);
        }
        if 2 * i + 2 < size {
            deps.push(&right);
        }
        if i % 2 == 0 {
            deps.push(&policy);
        }
        fixture = fixture.stencil(&format!("s{i}"), i32::from(i % 7 == 3), &deps);
    }
    for i in (0..size).step_by(2) {
        fixture = fixture.policy(&format!("p{i}"), &[]);
    }
    fixture.build()
}

#[test]
fn test_closure_is_closed_under_dependencies() {
    let catalog = layered_catalog(200);
    let closure = resolve_catalog(&catalog).unwrap();

    for name in &closure.required {
        for raw in catalog.dependencies_of(name).unwrap() {
            let dependency = QualifiedName::parse(raw).unwrap();
            assert!(closure.contains(&dependency), "{name} -> {dependency} missing");
        }
    }
}

#[test]
fn test_closure_is_union_of_single_root_closures() {
    let catalog = layered_catalog(120);
    let roots = initial_unit_names(&catalog);
    let combined = compute_required_closure(&catalog, &roots).unwrap();

    let mut union = BTreeSet::new();
    for root in &roots {
        let single = compute_required_closure(&catalog, std::slice::from_ref(root)).unwrap();
        union.extend(single.required);
    }
    assert_eq!(combined.required, union);
}

#[test]
fn test_closure_matches_graph_reachability() {
    let catalog = layered_catalog(90);
    let graph = DependencyGraph::from_catalog(&catalog).unwrap();
    assert!(!graph.has_cycles());

    let closure = resolve_catalog(&catalog).unwrap();
    let mut reachable = BTreeSet::new();
    for root in &closure.roots {
        reachable.insert(root.clone());
        reachable.extend(graph.get_transitive_deps(root));
    }
    assert_eq!(closure.required, reachable);
    assert!(closure.cycles.is_empty());
}

#[test]
fn test_resolution_is_deterministic() {
    let catalog = layered_catalog(150);
    let first = resolve_catalog(&catalog).unwrap();
    for _ in 0..5 {
        assert_eq!(resolve_catalog(&catalog).unwrap(), first);
    }
}

#[test]
fn test_selection_keeps_declaration_order() {
    let catalog = CatalogFixture::new()
        .stencil("zeta", 1, &["stencils/alpha", "helm_charts/b", "helm_charts/a"])
        .stencil("unused", 0, &[])
        .stencil("alpha", 0, &[])
        .helm_release("a", &[])
        .helm_release("b", &[])
        .build();

    let closure = resolve_catalog(&catalog).unwrap();
    let units = select_required(&catalog, &closure.required);

    let stencils: Vec<&str> = units.stencils.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(stencils, ["zeta", "alpha"]);
    let charts: Vec<&str> = units.helm_releases.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(charts, ["a", "b"]);
}

#[test]
fn test_cycles_reported_per_root() {
    let catalog = CatalogFixture::new()
        .stencil("a", 1, &["stencils/b"])
        .stencil("b", 1, &["stencils/a"])
        .build();

    let closure = resolve_catalog(&catalog).unwrap();
    assert_eq!(closure.len(), 2);
    assert_eq!(closure.cycles.len(), 2);
    assert_eq!(closure.cycles[0].root, UnitKind::Stencil.qualify("a"));
    assert_eq!(closure.cycles[0].to, UnitKind::Stencil.qualify("a"));
    assert_eq!(closure.cycles[1].root, UnitKind::Stencil.qualify("b"));
    assert_eq!(closure.cycles[1].to, UnitKind::Stencil.qualify("b"));
}

#[test]
fn test_no_roots_means_nothing_required() {
    let catalog = CatalogFixture::new()
        .stencil("a", 0, &["stencils/ghost"])
        .policy("p", &[])
        .build();

    let closure = resolve_catalog(&catalog).unwrap();
    assert!(closure.is_empty());
    assert!(select_required(&catalog, &closure.required).is_empty());
}
