//! Dependency resolution over template catalogs.
//!
//! # Pipeline
//!
//! 1. [`initial_unit_names`] picks the roots: every stencil with
//!    `min_usage > 0`.
//! 2. [`compute_required_closure`] walks each root depth-first and unions
//!    everything reachable into a [`Closure`]. Back-edges become
//!    [`CycleWarning`]s; unresolvable references abort.
//! 3. [`select_required`] projects the catalog onto the closure, keeping
//!    declaration order, for the manifest assembler.
//!
//! [`DependencyGraph`] is a separate, read-only view of the same edges used
//! to explain a closure (`starter resolve --tree`).
//!
//! # Example
//!
//! ```rust
//! use starter_bundle::catalog::Catalog;
//! use starter_bundle::resolver::{resolve_catalog, select_required};
//!
//! let catalog = Catalog::from_json_str(
//!     r#"{"name": "demo", "templates": {"stencils": [
//!         {"name": "web", "filename": "web.yml", "min_usage": 1,
//!          "dependencies": ["stencils/procfile"]},
//!         {"name": "procfile", "filename": "Procfile"}
//!     ]}}"#,
//!     "templates.json",
//! )?;
//!
//! let closure = resolve_catalog(&catalog)?;
//! assert_eq!(closure.len(), 2);
//!
//! let units = select_required(&catalog, &closure.required);
//! assert_eq!(units.stencils.len(), 2);
//! # Ok::<(), starter_bundle::core::BundleError>(())
//! ```

pub mod closure;
pub mod dependency_graph;
pub mod filter;

pub use closure::{
    Closure, CycleWarning, compute_required_closure, initial_unit_names, resolve_catalog,
};
pub use dependency_graph::DependencyGraph;
pub use filter::{RequiredUnits, filter_by_required_names, filter_required, select_required};
