//! Error types for source access and scanning.

use godeps_core::{ModuleError, ParseError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("invalid location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("missing credential {}: {source}", .path.display())]
    MissingCredential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the home directory")]
    NoHomeDirectory,

    #[error("error cloning repository: {0}")]
    Fetch(#[from] git2::Error),

    #[error("none of the branches {tried:?} exist in {url}")]
    BranchNotFound { url: String, tried: Vec<String> },

    #[error("failed to walk the source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse go.mod: {0}")]
    Module(#[from] ModuleError),

    #[error("failed to parse file: {0}")]
    Parse(#[from] ParseError),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
