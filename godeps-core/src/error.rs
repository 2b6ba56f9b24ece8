//! Error types for Go source analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the header of a `.go` file.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The package clause or import section is not well formed.
    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: u32,
        message: String,
    },

    #[error("Parser error: {0}")]
    ParserError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl ParseError {
    pub(crate) fn syntax(file: &str, line: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

/// Errors raised while locating or reading `go.mod`.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("no go.mod file found in the source tree")]
    NotFound,

    #[error("{path}: no module directive")]
    MissingDirective { path: PathBuf },

    #[error("{path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: u32,
        message: String,
    },
}

impl ModuleError {
    pub(crate) fn malformed(path: &str, line: u32, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: PathBuf::from(path),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
