//! JSON export of the dependency graph.

use crate::graph::DependencyGraph;
use crate::render::RenderError;
use std::path::Path;
use tracing::debug;

/// Builds the JSON document for a graph.
pub fn to_json(graph: &DependencyGraph, module_root: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "version": "1.0",
        "module": module_root,
        "stats": graph.stats(),
        "nodes": graph.nodes(),
        "edges": graph.edges(),
    })
}

/// Writes the graph as pretty-printed JSON to `path`.
pub fn export_json(
    graph: &DependencyGraph,
    module_root: Option<&str>,
    path: &Path,
) -> Result<(), RenderError> {
    let export = to_json(graph, module_root);
    let text = serde_json::to_string_pretty(&export).map_err(|e| RenderError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    std::fs::write(path, text).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Exported graph to {}", path.display());
    Ok(())
}
