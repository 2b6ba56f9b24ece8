//! godeps Core - Go source analysis
//!
//! This crate holds the pieces of godeps that look at Go sources without
//! touching the network or the graph:
//!
//! - [`module`] reads `go.mod` and yields the module root
//! - [`package`] maps a file path onto the package that owns it
//! - [`imports`] extracts the import paths declared by a `.go` file
//!
//! # Example
//!
//! ```no_run
//! use godeps_core::{derive_package, ImportExtractor, ModuleFile};
//! use std::path::Path;
//!
//! let module = ModuleFile::parse("go.mod", "module example.com/mod\n").unwrap();
//! let package = derive_package(&module.module_path, Path::new("pkg/file.go"));
//! assert_eq!(package, "example.com/mod/pkg");
//!
//! let mut extractor = ImportExtractor::new().unwrap();
//! let imports = extractor
//!     .extract("package pkg\n\nimport \"fmt\"\n", "pkg/file.go")
//!     .unwrap();
//! assert_eq!(imports, vec!["fmt".to_string()]);
//! ```

pub mod error;
pub mod imports;
pub mod module;
pub mod package;

pub use error::{ModuleError, ParseError, Result};
pub use imports::{FileHeader, ImportExtractor, ImportSpec};
pub use module::{is_module_file, select_module_file, ModuleFile, MODULE_FILE_NAME};
pub use package::{derive_package, is_internal, is_go_source, is_test_source};
