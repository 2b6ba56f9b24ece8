//! Shallow git clones over SSH.
//!
//! The checkout lives in a temporary directory that is deleted when the
//! [`ClonedTree`] is dropped.

use crate::error::{Result, SourceError};
use crate::location::RepoLocation;
use crate::tree::SourceTree;
use git2::build::RepoBuilder;
use git2::{Cred, ErrorCode, FetchOptions, RemoteCallbacks};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// SSH user for git hosts.
pub const DEFAULT_SSH_USER: &str = "git";

/// Branch names tried when none are configured.
pub const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

/// Clone configuration.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Branches to try, in order. The first one that exists is cloned.
    pub branches: Vec<String>,
    /// Private key used for SSH authentication.
    pub key_path: PathBuf,
    /// History depth; `0` fetches everything.
    pub depth: i32,
}

impl CloneOptions {
    /// Default options using `key_path` for authentication.
    pub fn with_key(key_path: impl Into<PathBuf>) -> Self {
        Self {
            branches: DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            key_path: key_path.into(),
            depth: 1,
        }
    }
}

/// Returns `~/.ssh/id_rsa` for the invoking user.
pub fn default_key_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(SourceError::NoHomeDirectory)?;
    Ok(home.join(".ssh").join("id_rsa"))
}

/// A freshly cloned working tree.
#[derive(Debug)]
pub struct ClonedTree {
    // Held so the checkout outlives every read.
    _dir: TempDir,
    checkout: PathBuf,
    branch: String,
    url: String,
}

impl ClonedTree {
    /// Clones `location` into a temporary directory.
    ///
    /// Branches are tried in the configured order; only a missing branch
    /// moves on to the next one. Any other failure is returned immediately.
    pub fn fetch(location: &RepoLocation, options: &CloneOptions) -> Result<Self> {
        check_credential(&options.key_path)?;

        let url = location.ssh_url();
        let dir = tempfile::Builder::new()
            .prefix("godeps-")
            .tempdir()
            .map_err(|e| SourceError::io(std::env::temp_dir(), e))?;

        let mut attempt = 0;
        let (branch, checkout) = try_branches(&url, &options.branches, |branch| {
            let checkout = dir.path().join(format!("checkout-{}", attempt));
            attempt += 1;
            info!("Cloning {} (branch {})", url, branch);

            let mut builder = RepoBuilder::new();
            builder
                .fetch_options(fetch_options(options))
                .branch(branch);
            builder.clone(&url, &checkout)?;
            Ok(checkout)
        })?;

        debug!("Checked out {} into {}", branch, checkout.display());
        Ok(Self {
            _dir: dir,
            checkout,
            branch,
            url,
        })
    }

    /// The branch that was cloned.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The SSH URL that was cloned.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SourceTree for ClonedTree {
    fn root(&self) -> &Path {
        &self.checkout
    }
}

/// Runs `clone` for each branch in order until one succeeds.
///
/// Only a missing branch moves on to the next one.
fn try_branches<T>(
    url: &str,
    branches: &[String],
    mut clone: impl FnMut(&str) -> std::result::Result<T, git2::Error>,
) -> Result<(String, T)> {
    for branch in branches {
        match clone(branch) {
            Ok(value) => return Ok((branch.clone(), value)),
            Err(e) if e.code() == ErrorCode::NotFound => {
                warn!("Branch {} not found: {}", branch, e.message());
            }
            Err(e) => return Err(SourceError::Fetch(e)),
        }
    }

    Err(SourceError::BranchNotFound {
        url: url.to_string(),
        tried: branches.to_vec(),
    })
}

fn check_credential(key_path: &Path) -> Result<()> {
    fs::File::open(key_path).map_err(|source| SourceError::MissingCredential {
        path: key_path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn fetch_options(options: &CloneOptions) -> FetchOptions<'static> {
    let key_path = options.key_path.clone();
    let mut asked = false;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username, _allowed| {
        // libgit2 asks again after a rejected key; stop instead of looping
        if asked {
            return Err(git2::Error::from_str("SSH authentication failed"));
        }
        asked = true;
        Cred::ssh_key(username.unwrap_or(DEFAULT_SSH_USER), None, &key_path, None)
    });

    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);
    if options.depth > 0 {
        fetch.depth(options.depth);
    }
    fetch
}
