//! Directed graph of a catalog's dependency edges.
//!
//! The closure walk in [`super::closure`] answers "what is required"; this
//! graph answers "why", by rendering the edges below each root as a tree.
//! Nodes are qualified names and an edge `a -> b` means `a` declares `b` as a
//! dependency.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::catalog::Catalog;
use crate::core::{BundleError, QualifiedName};

/// Dependency graph over qualified unit names.
pub struct DependencyGraph {
    graph: DiGraph<QualifiedName, ()>,
    node_map: HashMap<QualifiedName, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build the graph of every declared edge in `catalog`.
    ///
    /// Every unit becomes a node even when it has no edges. Malformed or
    /// unknown references are rejected the same way resolution rejects them.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, BundleError> {
        let mut graph = Self::new();

        for unit in catalog.units() {
            let from = unit.qualified_name();
            graph.ensure_node(from.clone());

            for raw in unit.dependencies() {
                let to = QualifiedName::parse(raw)?;
                catalog.dependencies_of(&to)?;
                graph.add_dependency(from.clone(), to);
            }
        }

        Ok(graph)
    }

    fn ensure_node(&mut self, node: QualifiedName) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node) {
            index
        } else {
            let index = self.graph.add_node(node.clone());
            self.node_map.insert(node, index);
            index
        }
    }

    /// Record that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: QualifiedName, to: QualifiedName) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Whether any cycle exists anywhere in the graph.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Immediate dependencies of `node`, in declaration order.
    pub fn get_direct_deps(&self, node: &QualifiedName) -> Vec<QualifiedName> {
        let Some(&node_idx) = self.node_map.get(node) else {
            return Vec::new();
        };

        // petgraph yields neighbors most-recent edge first
        let mut deps: Vec<QualifiedName> =
            self.graph.neighbors(node_idx).map(|idx| self.graph[idx].clone()).collect();
        deps.reverse();
        deps
    }

    /// Every unit reachable from `node`, excluding `node` unless it sits on a cycle.
    pub fn get_transitive_deps(&self, node: &QualifiedName) -> BTreeSet<QualifiedName> {
        let mut deps = BTreeSet::new();
        let mut queue = VecDeque::new();

        if let Some(&node_idx) = self.node_map.get(node) {
            queue.push_back(node_idx);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the dependencies below `root` as an ASCII tree.
    ///
    /// A unit already printed on the current path is marked as a circular
    /// reference instead of being expanded again. A unit whose dependencies
    /// were already expanded elsewhere under `root` is printed once more and
    /// marked `(see above)`, so the output has one line per edge reached.
    pub fn to_tree_string(&self, root: &QualifiedName) -> String {
        let mut result = format!("{root}\n");
        let mut path = HashSet::from([root.clone()]);
        let mut expanded = HashSet::from([root.clone()]);
        let mut stack = vec![TreeFrame {
            node: root.clone(),
            deps: self.get_direct_deps(root),
            next: 0,
            prefix: String::new(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(dep) = frame.deps.get(frame.next).cloned() else {
                if let Some(done) = stack.pop() {
                    path.remove(&done.node);
                }
                continue;
            };
            frame.next += 1;

            let is_last = frame.next == frame.deps.len();
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };
            let prefix = frame.prefix.clone();

            if path.contains(&dep) {
                result.push_str(&format!("{prefix}{connector}{dep} (circular reference)\n"));
                continue;
            }

            let deps = self.get_direct_deps(&dep);
            if !expanded.insert(dep.clone()) && !deps.is_empty() {
                result.push_str(&format!("{prefix}{connector}{dep} (see above)\n"));
                continue;
            }

            result.push_str(&format!("{prefix}{connector}{dep}\n"));
            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            path.insert(dep.clone());
            stack.push(TreeFrame {
                node: dep,
                deps,
                next: 0,
                prefix: child_prefix,
            });
        }

        result
    }
}

struct TreeFrame {
    node: QualifiedName,
    deps: Vec<QualifiedName>,
    next: usize,
    prefix: String,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
