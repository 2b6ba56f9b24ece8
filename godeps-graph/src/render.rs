//! Graphviz rendering.
//!
//! The graph is serialized to DOT with edges pointing from a dependency to
//! the package that imports it, written to disk, and handed to `dot`.

use crate::graph::DependencyGraph;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Graphviz is not installed: `{program} -V` failed: {reason}")]
    ToolUnavailable { program: String, reason: String },

    #[error("couldn't write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Options for DOT serialization.
#[derive(Debug, Clone)]
pub struct DotOptions {
    /// Name of the digraph.
    pub graph_name: String,

    /// When set, packages under this root are drawn apart from external imports.
    pub module_root: Option<String>,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            graph_name: "G".to_string(),
            module_root: None,
        }
    }
}

/// Options for the layout step.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Layout program to invoke.
    pub program: String,
    /// Output format passed as `-T<format>`.
    pub format: String,
    /// Graph description file.
    pub dot_file: PathBuf,
    /// Rendered diagram file.
    pub output_file: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::with_format("pdf")
    }
}

impl RenderOptions {
    /// Default file names in the working directory for the given format.
    pub fn with_format(format: &str) -> Self {
        Self {
            program: "dot".to_string(),
            format: format.to_string(),
            dot_file: PathBuf::from("graph.dot"),
            output_file: PathBuf::from(format!("graph.{}", format)),
        }
    }
}

/// Converts the graph to a DOT string.
///
/// Nodes and edges are emitted in sorted order so the output is stable.
pub fn to_dot(graph: &DependencyGraph, options: &DotOptions) -> String {
    let mut lines = Vec::new();

    lines.push(format!("digraph {} {{", quote(&options.graph_name)));

    if options.module_root.is_some() {
        lines.push("    node [shape=box];".to_string());
    }

    let internal: Option<HashSet<&str>> = options
        .module_root
        .as_deref()
        .map(|root| graph.internal_packages(root).into_iter().collect());

    for name in graph.nodes() {
        let style = match &internal {
            Some(internal) if !internal.contains(name) => " [style=dashed, color=gray40]",
            _ => "",
        };
        lines.push(format!("    {}{};", quote(name), style));
    }

    // Dependency first: an arrow reads "is imported by".
    for edge in graph.edges() {
        lines.push(format!(
            "    {} -> {};",
            quote(&edge.dependency),
            quote(&edge.package)
        ));
    }

    lines.push("}".to_string());
    lines.push(String::new());

    lines.join("\n")
}

/// Writes DOT text to `path`, replacing any existing file.
pub fn write_dot(path: &Path, dot: &str) -> Result<(), RenderError> {
    std::fs::write(path, dot).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} ({} bytes)", path.display(), dot.len());
    Ok(())
}

/// Checks that the layout program can be started.
pub fn check_layout_tool(program: &str) -> Result<(), RenderError> {
    let check = Command::new(program).arg("-V").output();

    match check {
        Ok(output) if output.status.success() => {
            // dot prints its version on stderr
            let version = String::from_utf8_lossy(&output.stderr);
            debug!("Using {}: {}", program, version.trim());
            Ok(())
        }
        Ok(output) => Err(RenderError::ToolUnavailable {
            program: program.to_string(),
            reason: format!("exit status {}", output.status),
        }),
        Err(e) => Err(RenderError::ToolUnavailable {
            program: program.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Runs the layout program over the DOT file.
pub fn render(options: &RenderOptions) -> Result<(), RenderError> {
    info!(
        "Rendering {} -> {}",
        options.dot_file.display(),
        options.output_file.display()
    );

    let output = Command::new(&options.program)
        .arg(format!("-T{}", options.format))
        .arg(&options.dot_file)
        .arg("-o")
        .arg(&options.output_file)
        .output()
        .map_err(|e| RenderError::ToolFailed {
            program: options.program.clone(),
            status: "spawn failure".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(RenderError::ToolFailed {
            program: options.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Quotes an identifier for DOT.
fn quote(id: &str) -> String {
    let escaped = id
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}
