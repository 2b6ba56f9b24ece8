//! godeps Graph - package dependency graph
//!
//! This crate owns the dependency graph between Go packages and their
//! imports, and turns it into Graphviz input.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with a string index so that
//! packages and import paths share one node namespace. Edges are stored
//! in the "depends on" direction and flipped at render time.
//!
//! # Example
//!
//! ```no_run
//! use godeps_graph::{to_dot, DotOptions, GraphBuilder};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_package("example.com/mod", ["fmt", "os"]);
//! let graph = builder.build();
//!
//! let dot = to_dot(&graph, &DotOptions::default());
//! assert!(dot.contains("\"fmt\" -> \"example.com/mod\""));
//! ```

mod builder;
mod export;
mod graph;
mod render;

pub use builder::GraphBuilder;
pub use export::{export_json, to_json};
pub use graph::{DependencyGraph, GraphEdge, GraphStats, NodeId};
pub use render::{
    check_layout_tool, render, to_dot, write_dot, DotOptions, RenderError, RenderOptions,
};
