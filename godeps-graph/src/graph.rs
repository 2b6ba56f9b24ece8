//! Core graph data structure.
//!
//! The DependencyGraph wraps petgraph and adds a name index. An edge
//! `A -> B` means package `A` imports `B`.

use godeps_core::is_internal;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The package dependency graph.
///
/// Every import target is itself a node, so no edge ever dangles, and each
/// `(package, dependency)` pair is stored once.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<String, ()>,

    /// Maps package names to graph node indexes.
    id_index: HashMap<String, NodeId>,
}

impl DependencyGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `name`, inserting it if absent.
    pub(crate) fn ensure_node(&mut self, name: &str) -> NodeId {
        if let Some(&index) = self.id_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.id_index.insert(name.to_string(), index);
        index
    }

    /// Records that `from` imports `to`. Repeated calls keep a single edge.
    pub(crate) fn add_dependency(&mut self, from: NodeId, to: NodeId) {
        self.graph.update_edge(from, to, ());
    }

    /// Returns true if `name` is a node.
    pub fn contains(&self, name: &str) -> bool {
        self.id_index.contains_key(name)
    }

    /// Gets the node index for a name.
    pub fn get_index(&self, name: &str) -> Option<NodeId> {
        self.id_index.get(name).copied()
    }

    /// Direct imports of `name`, sorted. `None` if `name` is not a node.
    pub fn dependencies(&self, name: &str) -> Option<BTreeSet<&str>> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Packages that import `name` directly, sorted.
    pub fn dependents(&self, name: &str) -> Option<BTreeSet<&str>> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Option<BTreeSet<&str>> {
        let index = self.get_index(name)?;
        Some(
            self.graph
                .neighbors_directed(index, direction)
                .filter_map(|idx| self.graph.node_weight(idx))
                .map(String::as_str)
                .collect(),
        )
    }

    /// All node names, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        nodes.sort_unstable();
        nodes
    }

    /// All `(package, dependency)` pairs, sorted.
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut edges: Vec<GraphEdge> = self
            .graph
            .edge_references()
            .filter_map(|edge_ref| {
                let package = self.graph.node_weight(edge_ref.source())?;
                let dependency = self.graph.node_weight(edge_ref.target())?;
                Some(GraphEdge {
                    package: package.clone(),
                    dependency: dependency.clone(),
                })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes under `module_root`, sorted.
    pub fn internal_packages(&self, module_root: &str) -> Vec<&str> {
        self.nodes()
            .into_iter()
            .filter(|name| is_internal(name, module_root))
            .collect()
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let leaves = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .count();

        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            leaves,
        }
    }
}

/// One "package imports dependency" relation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GraphEdge {
    pub package: String,
    pub dependency: String,
}

/// Graph statistics for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Nodes with no imports of their own.
    pub leaves: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_node_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let a = graph.ensure_node("a");
        let again = graph.ensure_node("a");
        assert_eq!(a, again);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = DependencyGraph::new();
        let a = graph.ensure_node("a");
        let b = graph.ensure_node("b");
        graph.add_dependency(a, b);
        graph.add_dependency(a, b);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies("a").unwrap(), BTreeSet::from(["b"]));
        assert_eq!(graph.dependents("b").unwrap(), BTreeSet::from(["a"]));
        assert!(graph.dependencies("b").unwrap().is_empty());
        assert!(graph.dependencies("missing").is_none());
    }

    #[test]
    fn test_internal_packages_and_stats() {
        let mut graph = DependencyGraph::new();
        let root = graph.ensure_node("m");
        let sub = graph.ensure_node("m/sub");
        let fmt = graph.ensure_node("fmt");
        graph.add_dependency(root, fmt);
        graph.add_dependency(sub, root);

        assert_eq!(graph.internal_packages("m"), vec!["m", "m/sub"]);
        assert_eq!(
            graph.stats(),
            GraphStats {
                node_count: 3,
                edge_count: 2,
                leaves: 1
            }
        );
    }
}
