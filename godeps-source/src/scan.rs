//! Scanning a source tree into a dependency graph.
//!
//! The scan is a single sequential pass: the module root is resolved once,
//! then every `.go` file contributes its imports to the package that owns it.
//! The first unreadable or unparseable file aborts the scan.

use crate::error::Result;
use crate::tree::SourceTree;
use godeps_core::{
    derive_package, is_go_source, is_test_source, select_module_file, ImportExtractor,
    ModuleError, ModuleFile,
};
use godeps_graph::{DependencyGraph, GraphBuilder};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scan configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Skip `*_test.go` files.
    pub exclude_tests: bool,
}

/// Result of scanning a tree.
#[derive(Debug)]
pub struct ScanResult {
    /// Module path from `go.mod`.
    pub module_root: String,
    /// The finished dependency graph.
    pub graph: DependencyGraph,
    /// Number of `.go` files parsed.
    pub files_scanned: usize,
    /// Number of distinct packages that own at least one file.
    pub packages: usize,
    /// Wall-clock time of the scan.
    pub duration_ms: u64,
}

/// Finds and parses the module file of `tree`.
///
/// When the tree holds more than one `go.mod`, the one closest to the root
/// is used and the rest are ignored.
pub fn resolve_module_root(tree: &dyn SourceTree, files: &[PathBuf]) -> Result<ModuleFile> {
    let chosen = select_module_file(files).ok_or(ModuleError::NotFound)?;

    for other in files
        .iter()
        .filter(|p| godeps_core::is_module_file(p) && *p != chosen)
    {
        warn!("Ignoring nested module file {}", other.display());
    }

    let contents = tree.read(chosen)?;
    let module = ModuleFile::parse(&chosen.to_string_lossy(), &contents)?;

    info!("Module root: {}", module.module_path);
    if let Some(version) = &module.go_version {
        debug!("go {}", version);
    }

    Ok(module)
}

/// Scans every Go source in `tree` and builds the dependency graph.
pub fn scan_tree(tree: &dyn SourceTree, options: &ScanOptions) -> Result<ScanResult> {
    let start = Instant::now();

    let files = tree.walk()?;
    let module = resolve_module_root(tree, &files)?;

    let mut extractor = ImportExtractor::new()?;
    let mut builder = GraphBuilder::new();
    let mut packages = BTreeSet::new();
    let mut files_scanned = 0;

    for relative in files.iter().filter(|p| is_go_source(p)) {
        if options.exclude_tests && is_test_source(relative) {
            debug!("Skipping test file {}", relative.display());
            continue;
        }

        // invalid UTF-8 becomes U+FFFD, which import paths reject
        let bytes = tree.read_bytes(relative)?;
        let source = String::from_utf8_lossy(&bytes);
        let package = derive_package(&module.module_path, relative);
        let imports = extractor.extract(&source, &relative.to_string_lossy())?;

        debug!(
            "{} -> {} ({} imports)",
            relative.display(),
            package,
            imports.len()
        );

        builder.add_package(&package, &imports);
        packages.insert(package);
        files_scanned += 1;
    }

    let graph = builder.build();
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Scanned {} files into {} packages ({} nodes, {} edges) in {}ms",
        files_scanned,
        packages.len(),
        graph.node_count(),
        graph.edge_count(),
        duration_ms
    );

    Ok(ScanResult {
        module_root: module.module_path,
        graph,
        files_scanned,
        packages: packages.len(),
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::tree::LocalTree;
    use godeps_core::ParseError;
    use godeps_graph::{to_dot, DotOptions};
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn two_file_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "go.mod", "module root\n\ngo 1.21\n");
        write(
            dir.path(),
            "main.go",
            "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println(\"hi\") }\n",
        );
        write(
            dir.path(),
            "sub/a.go",
            "package sub\n\nimport (\n\t\"fmt\"\n\t\"root\"\n)\n",
        );
        dir
    }

    #[test]
    fn test_two_file_project() {
        let dir = two_file_project();
        let tree = LocalTree::open(dir.path()).unwrap();

        let result = scan_tree(&tree, &ScanOptions::default()).unwrap();
        let graph = &result.graph;

        assert_eq!(result.module_root, "root");
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.packages, 2);
        assert_eq!(graph.nodes(), vec!["fmt", "root", "root/sub"]);
        assert_eq!(graph.dependencies("root").unwrap(), BTreeSet::from(["fmt"]));
        assert_eq!(
            graph.dependencies("root/sub").unwrap(),
            BTreeSet::from(["fmt", "root"])
        );

        let dot = to_dot(graph, &DotOptions::default());
        assert!(dot.contains("\"fmt\" -> \"root\";"));
        assert!(dot.contains("\"fmt\" -> \"root/sub\";"));
        assert!(dot.contains("\"root\" -> \"root/sub\";"));
        assert_eq!(dot.matches("->").count(), 3);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = two_file_project();
        let tree = LocalTree::open(dir.path()).unwrap();

        let first = scan_tree(&tree, &ScanOptions::default()).unwrap();
        let second = scan_tree(&tree, &ScanOptions::default()).unwrap();

        assert_eq!(first.graph.nodes(), second.graph.nodes());
        assert_eq!(first.graph.edges(), second.graph.edges());
    }

    #[test]
    fn test_exclude_tests() {
        let dir = two_file_project();
        write(
            dir.path(),
            "sub/a_test.go",
            "package sub\n\nimport \"testing\"\n",
        );
        let tree = LocalTree::open(dir.path()).unwrap();

        let with_tests = scan_tree(&tree, &ScanOptions::default()).unwrap();
        assert!(with_tests.graph.contains("testing"));
        assert_eq!(with_tests.files_scanned, 3);

        let options = ScanOptions {
            exclude_tests: true,
        };
        let without_tests = scan_tree(&tree, &options).unwrap();
        assert!(!without_tests.graph.contains("testing"));
        assert_eq!(without_tests.files_scanned, 2);
    }

    #[test]
    fn test_nested_module_file_is_ignored() {
        let dir = two_file_project();
        write(dir.path(), "tools/go.mod", "module root/tools\n");
        write(dir.path(), "tools/t.go", "package tools\n");
        let tree = LocalTree::open(dir.path()).unwrap();

        let result = scan_tree(&tree, &ScanOptions::default()).unwrap();
        assert_eq!(result.module_root, "root");
        assert!(result.graph.contains("root/tools"));
    }

    #[test]
    fn test_missing_module_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.go", "package main\n");
        let tree = LocalTree::open(dir.path()).unwrap();

        let err = scan_tree(&tree, &ScanOptions::default()).unwrap_err();
        assert!(
            matches!(err, SourceError::Module(ModuleError::NotFound)),
            "got {err:?}"
        );
    }

    #[test]
    fn test_malformed_module_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "go.mod", "go 1.21\n");
        let tree = LocalTree::open(dir.path()).unwrap();

        let err = scan_tree(&tree, &ScanOptions::default()).unwrap_err();
        assert!(
            matches!(err, SourceError::Module(ModuleError::MissingDirective { .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn test_invalid_utf8_outside_header_is_ignored() {
        let dir = two_file_project();
        fs::write(
            dir.path().join("sub/latin1.go"),
            b"package sub\n\nimport \"os\"\n\n// caf\xe9\nfunc F() {}\n",
        )
        .unwrap();
        let tree = LocalTree::open(dir.path()).unwrap();

        let result = scan_tree(&tree, &ScanOptions::default()).unwrap();
        assert!(result.graph.contains("os"));
        assert_eq!(result.files_scanned, 3);
    }

    #[test]
    fn test_invalid_utf8_in_import_path_is_a_syntax_error() {
        let dir = two_file_project();
        fs::write(
            dir.path().join("sub/bad.go"),
            b"package sub\n\nimport \"caf\xe9\"\n",
        )
        .unwrap();
        let tree = LocalTree::open(dir.path()).unwrap();

        let err = scan_tree(&tree, &ScanOptions::default()).unwrap_err();
        assert!(
            matches!(err, SourceError::Parse(ParseError::Syntax { line: 3, .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn test_one_bad_file_aborts_the_scan() {
        let dir = two_file_project();
        write(dir.path(), "broken/b.go", "import \"fmt\"\n");
        let tree = LocalTree::open(dir.path()).unwrap();

        let err = scan_tree(&tree, &ScanOptions::default()).unwrap_err();
        match err {
            SourceError::Parse(ParseError::Syntax { file, .. }) => {
                assert!(file.ends_with("b.go"), "file was {file}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
