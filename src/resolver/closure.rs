//! Transitive dependency closure over a template catalog.
//!
//! Starting from a list of root units, every unit reachable through declared
//! dependencies is required. Each root is walked depth-first with its own
//! tri-color state:
//!
//! - **White**: not yet seen during this root's walk
//! - **Grey**: on the current path, its dependencies are being visited
//! - **Black**: it and everything below it are done
//!
//! Reaching a grey unit is a back-edge. The walk records a [`CycleWarning`],
//! logs it, and carries on with the next sibling, so cyclic catalogs still
//! resolve and every unit on the cycle is required. Reaching a black unit is
//! skipped. When a root's walk ends its black set is merged into the shared
//! accumulator and the color map is dropped, so cycles are reported relative
//! to the root that found them.
//!
//! The walk keeps an explicit stack of frames instead of recursing, so the
//! depth of a catalog's dependency chains is bounded by heap, not call stack.
//!
//! Any malformed or unknown reference aborts the whole resolution with
//! [`BundleError::UnresolvedDependency`]; no partial closure is returned.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::core::{BundleError, QualifiedName, UnitKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// A back-edge found while walking one root's dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleWarning {
    /// The root whose walk found the back-edge.
    pub root: QualifiedName,
    /// The unit whose dependency list contains the back-edge.
    pub from: QualifiedName,
    /// The in-progress unit that was reached again.
    pub to: QualifiedName,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "circular dependency for '{}' detected while processing dependency list of '{}' (via '{}')",
            self.to, self.root, self.from
        )
    }
}

impl From<CycleWarning> for BundleError {
    fn from(warning: CycleWarning) -> Self {
        Self::CycleDetected {
            root: warning.root.to_string(),
            name: warning.to.to_string(),
        }
    }
}

/// Result of a closure computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Closure {
    /// The roots the walk started from, in the order given.
    pub roots: Vec<QualifiedName>,
    /// Every unit reachable from any root, roots included.
    ///
    /// Iteration order is deterministic but carries no meaning.
    pub required: BTreeSet<QualifiedName>,
    /// Back-edges in discovery order.
    pub cycles: Vec<CycleWarning>,
}

impl Closure {
    /// Whether `name` is required.
    #[must_use]
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.required.contains(name)
    }

    /// Number of required units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.required.len()
    }

    /// Whether no unit is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Required units of one kind, in name order.
    pub fn required_of(&self, kind: UnitKind) -> impl Iterator<Item = &QualifiedName> {
        self.required.iter().filter(move |name| name.kind() == kind)
    }

    /// Turn the first recorded cycle into an error.
    ///
    /// Used by callers that want strict resolution; the default walk only
    /// warns.
    pub fn deny_cycles(self) -> Result<Self, BundleError> {
        match self.cycles.first() {
            Some(cycle) => Err(cycle.clone().into()),
            None => Ok(self),
        }
    }
}

/// Qualified names of every stencil with `min_usage > 0`, in declaration order.
#[must_use]
pub fn initial_unit_names(catalog: &Catalog) -> Vec<QualifiedName> {
    catalog
        .templates
        .stencils
        .iter()
        .filter(|stencil| stencil.min_usage > 0)
        .map(|stencil| UnitKind::Stencil.qualify(&stencil.name))
        .collect()
}

/// Resolve the closure of the catalog's own roots.
pub fn resolve_catalog(catalog: &Catalog) -> Result<Closure, BundleError> {
    compute_required_closure(catalog, &initial_unit_names(catalog))
}

/// Compute every unit transitively required by `roots`.
///
/// Roots are walked in order with a fresh color map each. Dependencies are
/// visited in declaration order.
pub fn compute_required_closure(
    catalog: &Catalog,
    roots: &[QualifiedName],
) -> Result<Closure, BundleError> {
    let mut closure = Closure {
        roots: roots.to_vec(),
        ..Closure::default()
    };

    for root in roots {
        let colors = traverse(catalog, root, &mut closure.cycles)?;
        let before = closure.required.len();
        closure.required.extend(
            colors.into_iter().filter(|(_, color)| *color == Color::Black).map(|(name, _)| name),
        );
        debug!(
            target: "resolver",
            "Root '{root}' added {} unit(s) to the required set",
            closure.required.len() - before
        );
    }

    Ok(closure)
}

struct Frame<'a> {
    name: QualifiedName,
    dependencies: &'a [String],
    next: usize,
}

/// Walk one root and return its final color map.
fn traverse(
    catalog: &Catalog,
    root: &QualifiedName,
    cycles: &mut Vec<CycleWarning>,
) -> Result<HashMap<QualifiedName, Color>, BundleError> {
    let mut colors: HashMap<QualifiedName, Color> = HashMap::new();
    let mut stack = vec![Frame {
        name: root.clone(),
        dependencies: catalog.dependencies_of(root)?,
        next: 0,
    }];
    colors.insert(root.clone(), Color::Grey);

    while let Some(frame) = stack.last_mut() {
        let dependencies = frame.dependencies;
        let Some(raw) = dependencies.get(frame.next) else {
            if let Some(done) = stack.pop() {
                colors.insert(done.name, Color::Black);
            }
            continue;
        };
        frame.next += 1;

        let child = QualifiedName::parse(raw)?;
        match colors.get(&child).copied().unwrap_or(Color::White) {
            Color::White => {
                let child_dependencies = catalog.dependencies_of(&child)?;
                colors.insert(child.clone(), Color::Grey);
                stack.push(Frame {
                    name: child,
                    dependencies: child_dependencies,
                    next: 0,
                });
            }
            Color::Grey => {
                let from = frame.name.clone();
                warn!(
                    target: "resolver",
                    "Circular dependency for '{child}' detected while processing dependency list of '{root}'"
                );
                cycles.push(CycleWarning {
                    root: root.clone(),
                    from,
                    to: child,
                });
            }
            Color::Black => {}
        }
    }

    Ok(colors)
}
