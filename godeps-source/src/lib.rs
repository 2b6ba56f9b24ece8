//! godeps Source - getting at the code
//!
//! This crate provides the read-only tree views godeps scans and the scan
//! itself:
//!
//! - [`LocalTree`] wraps a directory on disk
//! - [`ClonedTree`] makes a shallow SSH clone into a temporary directory
//! - [`scan_tree`] walks either one and produces the dependency graph

mod clone;
mod error;
mod location;
mod scan;
mod tree;

pub use clone::{default_key_path, CloneOptions, ClonedTree, DEFAULT_BRANCHES, DEFAULT_SSH_USER};
pub use error::{Result, SourceError};
pub use location::RepoLocation;
pub use scan::{resolve_module_root, scan_tree, ScanOptions, ScanResult};
pub use tree::{LocalTree, SourceTree};
