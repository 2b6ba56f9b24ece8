//! Repository locations.
//!
//! Users pass the `https://` address they see in a browser; cloning goes
//! over SSH, so the address is rewritten to the scp-like
//! `git@host:owner/repo` form before any network access.

use crate::error::{Result, SourceError};
use std::fmt;

const HTTPS_PREFIX: &str = "https://";

/// A validated remote repository location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    https: String,
    host: String,
    path: String,
}

impl RepoLocation {
    /// Validates an `https://host/owner/repo` location.
    pub fn parse(location: &str) -> Result<Self> {
        let invalid = |reason: &str| SourceError::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        let rest = location
            .strip_prefix(HTTPS_PREFIX)
            .ok_or_else(|| invalid("expected an https:// link"))?;

        let (host, path) = rest
            .split_once('/')
            .ok_or_else(|| invalid("missing repository path"))?;
        let path = path.trim_end_matches('/');

        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if path.is_empty() {
            return Err(invalid("missing repository path"));
        }
        if host.contains(char::is_whitespace) || path.contains(char::is_whitespace) {
            return Err(invalid("whitespace in location"));
        }

        Ok(Self {
            https: location.to_string(),
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    /// The SSH form used for cloning, e.g. `git@github.com:owner/repo`.
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}", self.host, self.path)
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.https)
    }
}
