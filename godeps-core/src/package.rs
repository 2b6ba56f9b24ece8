//! Package naming.
//!
//! Go packages are identified by directory, so every file in one directory
//! maps to the same package node.

use std::path::{Component, Path};

/// Returns the package that owns the file at `file_relative_path`.
///
/// The file's directory is joined onto `module_root` with `/`. A file at the
/// tree root belongs to the module root itself.
pub fn derive_package(module_root: &str, file_relative_path: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();

    if let Some(dir) = file_relative_path.parent() {
        for component in dir.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::ParentDir => {
                    segments.pop();
                }
                _ => {}
            }
        }
    }

    let root = module_root.trim_end_matches('/');
    if segments.is_empty() {
        return root.to_string();
    }
    if root.is_empty() {
        return segments.join("/");
    }
    format!("{}/{}", root, segments.join("/"))
}

/// Returns true if `package` lives under `module_root`.
pub fn is_internal(package: &str, module_root: &str) -> bool {
    package == module_root
        || package
            .strip_prefix(module_root)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Returns true for `.go` files.
pub fn is_go_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "go")
}

/// Returns true for Go test files (`*_test.go`).
pub fn is_test_source(path: &Path) -> bool {
    is_go_source(path)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with("_test.go"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_package_examples() {
        assert_eq!(
            derive_package("example.com/mod", Path::new("pkg/file.go")),
            "example.com/mod/pkg"
        );
        assert_eq!(
            derive_package("example.com/mod", Path::new("file.go")),
            "example.com/mod"
        );
    }

    #[test]
    fn test_derive_package_is_deterministic() {
        let path = Path::new("internal/store/db.go");
        let first = derive_package("github.com/acme/app", path);
        let second = derive_package("github.com/acme/app", path);
        assert_eq!(first, second);
        assert_eq!(first, "github.com/acme/app/internal/store");
    }

    #[test]
    fn test_files_in_same_directory_collapse() {
        let a = derive_package("m", Path::new("sub/a.go"));
        let b = derive_package("m", Path::new("sub/b_test.go"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_package_cleans_components() {
        assert_eq!(derive_package("m", Path::new("./a/./b/x.go")), "m/a/b");
        assert_eq!(derive_package("m/", Path::new("a/x.go")), "m/a");
    }

    #[test]
    fn test_is_internal() {
        assert!(is_internal("example.com/mod", "example.com/mod"));
        assert!(is_internal("example.com/mod/pkg", "example.com/mod"));
        assert!(!is_internal("example.com/module", "example.com/mod"));
        assert!(!is_internal("fmt", "example.com/mod"));
    }

    #[test]
    fn test_source_classification() {
        assert!(is_go_source(Path::new("a/b.go")));
        assert!(!is_go_source(Path::new("go.mod")));
        assert!(is_test_source(Path::new("a/b_test.go")));
        assert!(!is_test_source(Path::new("a/b.go")));
    }
}
