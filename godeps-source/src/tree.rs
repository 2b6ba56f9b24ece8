//! Read-only views over a directory tree.

use crate::error::{Result, SourceError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A tree of files that can be listed and read.
///
/// Paths handed out and accepted are relative to [`SourceTree::root`].
pub trait SourceTree {
    /// Absolute location of the tree on disk.
    fn root(&self) -> &Path;

    /// Every regular file in the tree, sorted, with `.git` excluded.
    fn walk(&self) -> Result<Vec<PathBuf>> {
        walk_dir(self.root())
    }

    /// Reads one file as UTF-8 text.
    fn read(&self, relative: &Path) -> Result<String> {
        let path = self.root().join(relative);
        fs::read_to_string(&path).map_err(|e| SourceError::io(path, e))
    }

    /// Reads one file as raw bytes.
    fn read_bytes(&self, relative: &Path) -> Result<Vec<u8>> {
        let path = self.root().join(relative);
        fs::read(&path).map_err(|e| SourceError::io(path, e))
    }
}

/// A tree backed by an existing local directory.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    /// Opens `root`, which must be a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let meta = fs::metadata(&root).map_err(|e| SourceError::io(root.clone(), e))?;
        if !meta.is_dir() {
            return Err(SourceError::InvalidLocation {
                location: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }
        Ok(Self { root })
    }
}

impl SourceTree for LocalTree {
    fn root(&self) -> &Path {
        &self.root
    }
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git")
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        // strip_prefix cannot fail for entries yielded under root
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    Ok(files)
}
