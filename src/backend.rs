//! # Version-Control Backends
//!
//! The stager never runs `git` or `svn` itself. It talks to two traits:
//!
//! - **`GitOperations`**: clone, checkout and "which commit is checked out".
//! - **`SvnOperations`**: checkout (latest or at a revision) and "which
//!   revision is checked out".
//!
//! `SystemGit` and `SystemSvn` implement them with the command-line tools
//! found on `PATH`. Tests substitute mock implementations to simulate fetch
//! failures without touching the network.

use std::path::Path;

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones `url` into the (empty) directory `dir`.
    fn clone_repo(&self, dir: &Path, url: &str) -> Result<()>;

    /// Checks out a branch, tag or commit in the clone at `dir`.
    fn checkout(&self, dir: &Path, ref_name: &str) -> Result<()>;

    /// Full hash of the commit currently checked out at `dir`.
    fn current_commit(&self, dir: &Path) -> Result<String>;
}

/// Trait for svn operations - allows mocking in tests
pub trait SvnOperations: Send + Sync {
    /// Checks out the head revision of `url` into `dir`.
    fn checkout_latest(&self, dir: &Path, url: &str) -> Result<()>;

    /// Checks out `url` at `rev` into `dir`.
    fn checkout_at_rev(&self, dir: &Path, url: &str, rev: &str) -> Result<()>;

    /// Revision of the working copy at `dir`.
    fn working_revision(&self, dir: &Path) -> Result<String>;
}

/// `GitOperations` backed by the system `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn clone_repo(&self, dir: &Path, url: &str) -> Result<()> {
        crate::git::clone_repo(dir, url)
    }

    fn checkout(&self, dir: &Path, ref_name: &str) -> Result<()> {
        crate::git::checkout(dir, ref_name)
    }

    fn current_commit(&self, dir: &Path) -> Result<String> {
        crate::git::current_commit(dir)
    }
}

/// `SvnOperations` backed by the system `svn` and `svnversion` commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSvn;

impl SvnOperations for SystemSvn {
    fn checkout_latest(&self, dir: &Path, url: &str) -> Result<()> {
        crate::svn::checkout_latest(dir, url)
    }

    fn checkout_at_rev(&self, dir: &Path, url: &str, rev: &str) -> Result<()> {
        crate::svn::checkout_at_rev(dir, url, rev)
    }

    fn working_revision(&self, dir: &Path) -> Result<String> {
        crate::svn::working_revision(dir)
    }
}
