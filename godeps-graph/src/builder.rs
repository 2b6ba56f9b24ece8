//! Graph builder for assembling the dependency graph one package at a time.
//!
//! Callers feed `(package, imports)` pairs, typically one per source file,
//! and take the finished graph with [`GraphBuilder::build`].

use crate::graph::DependencyGraph;
use tracing::trace;

/// Builds a DependencyGraph from per-file import lists.
///
/// The builder is append-only: nodes and edges are never removed.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DependencyGraph,
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package and the imports declared for it.
    ///
    /// The package is inserted even when `imports` is empty. Each import
    /// becomes a node of its own, so external dependencies show up as leaves.
    pub fn add_package<I, S>(&mut self, package: &str, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let from = self.graph.ensure_node(package);
        for import in imports {
            let import = import.as_ref();
            let to = self.graph.ensure_node(import);
            self.graph.add_dependency(from, to);
            trace!(package, import, "recorded dependency");
        }
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> DependencyGraph {
        self.graph
    }
}
