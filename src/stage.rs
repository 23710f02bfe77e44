//! # Staging
//!
//! Every dependency of a manifest is fetched into its own private temporary
//! directory before anything is copied to a destination. All dependencies are
//! fetched at the same time, one worker per manifest entry, and the result is
//! all-or-nothing:
//!
//! - a worker that fails removes its own staging directory and records the
//!   failure without disturbing the others;
//! - once every worker has finished, a single failure anywhere causes every
//!   staging directory to be removed and one aggregate error to be returned.
//!
//! A partially staged manifest would produce a pinned manifest that does not
//! reproduce, so it is never handed to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::{debug, info, warn};
use rayon::prelude::*;
use tempfile::TempDir;

use crate::backend::{GitOperations, SvnOperations, SystemGit, SystemSvn};
use crate::error::{Error, Result};
use crate::manifest::{Dependency, Manifest};

/// A fetched dependency waiting to be reconciled.
///
/// Owns its staging directory: dropping the value deletes the directory.
#[derive(Debug)]
pub struct StagedDependency {
    staging: TempDir,
    pinned: Dependency,
}

impl StagedDependency {
    pub fn new(staging: TempDir, pinned: Dependency) -> Self {
        Self { staging, pinned }
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// The dependency with its revision replaced by the one actually fetched.
    pub fn pinned(&self) -> &Dependency {
        &self.pinned
    }

    /// The part of the staging directory that belongs at the destination.
    pub fn source_dir(&self) -> PathBuf {
        self.staging.path().join(self.pinned.subtree_to_copy())
    }

    /// Deletes the staging directory, logging rather than failing on error.
    pub fn cleanup(self) {
        remove_staging_dir(self.staging);
    }
}

/// Fetches manifests into staging directories.
pub struct Stager {
    git_ops: Box<dyn GitOperations>,
    svn_ops: Box<dyn SvnOperations>,
    staging_root: Option<PathBuf>,
}

impl Stager {
    /// A stager using the system `git`, `svn` and `svnversion` tools.
    pub fn new() -> Self {
        Self::with_operations(Box::new(SystemGit), Box::new(SystemSvn))
    }

    /// A stager with custom backends, mostly useful for tests.
    pub fn with_operations(
        git_ops: Box<dyn GitOperations>,
        svn_ops: Box<dyn SvnOperations>,
    ) -> Self {
        Self {
            git_ops,
            svn_ops,
            staging_root: None,
        }
    }

    /// Create staging directories under `root` instead of the system temp
    /// directory.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Fetches every dependency of `manifest` concurrently.
    ///
    /// Returns the staged dependencies keyed by destination directory, or a
    /// `Staging` error naming each dependency that failed. On error no
    /// staging directory is left behind.
    pub fn stage(&self, manifest: &Manifest) -> Result<BTreeMap<String, StagedDependency>> {
        if manifest.is_empty() {
            return Ok(BTreeMap::new());
        }

        // One worker per dependency; they spend their time waiting on
        // subprocesses, not on the CPU.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(manifest.len())
            .thread_name(|i| format!("courier-stage-{}", i))
            .build()
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;

        let entries: Vec<(&String, &Dependency)> = manifest.iter().collect();
        let results = Mutex::new(StageResults::default());

        pool.install(|| {
            entries.par_iter().for_each(|(dir, dependency)| {
                info!("Staging {} dependency {:?}", dependency.vcs(), dir);
                let outcome = self.stage_dependency(dependency);
                record_locked(&results, dir, outcome);
            });
        });

        results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_result()
    }

    fn stage_dependency(&self, dependency: &Dependency) -> Result<StagedDependency> {
        let staging = self.make_staging_dir()?;
        match self.fetch(staging.path(), dependency) {
            Ok(pinned) => Ok(StagedDependency { staging, pinned }),
            Err(e) => {
                remove_staging_dir(staging);
                Err(e)
            }
        }
    }

    /// Fetches `dependency` into `dir` and returns its pinned form.
    fn fetch(&self, dir: &Path, dependency: &Dependency) -> Result<Dependency> {
        let revision = match dependency {
            Dependency::Git(git) => {
                self.git_ops.clone_repo(dir, &git.url)?;
                self.git_ops.checkout(dir, &git.r#ref)?;
                verify_subtree(dir, dependency.subtree_to_copy())?;
                self.git_ops.current_commit(dir)?
            }
            Dependency::Svn(svn) => {
                match &svn.rev {
                    Some(rev) => self.svn_ops.checkout_at_rev(dir, &svn.url, rev)?,
                    None => self.svn_ops.checkout_latest(dir, &svn.url)?,
                }
                verify_subtree(dir, dependency.subtree_to_copy())?;
                self.svn_ops.working_revision(dir)?
            }
        };
        Ok(dependency.pinned(revision))
    }

    fn make_staging_dir(&self) -> Result<TempDir> {
        let prefix = format!("courier_{}_", staging_user());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let staging = match &self.staging_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("Created staging dir {:?}", staging.path());
        Ok(staging)
    }
}

impl Default for Stager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct StageResults {
    staged: BTreeMap<String, StagedDependency>,
    failures: Vec<(String, Error)>,
}

impl StageResults {
    fn record(&mut self, dir: &str, outcome: Result<StagedDependency>) {
        match outcome {
            Ok(staged) => {
                info!("Finished staging dependency {:?}", dir);
                self.staged.insert(dir.to_string(), staged);
            }
            Err(e) => {
                warn!("Error while staging dependency {:?}: {}", dir, e);
                self.failures.push((dir.to_string(), e));
            }
        }
    }

    fn into_result(mut self) -> Result<BTreeMap<String, StagedDependency>> {
        if self.failures.is_empty() {
            return Ok(self.staged);
        }

        for (_, staged) in std::mem::take(&mut self.staged) {
            staged.cleanup();
        }
        self.failures.sort_by(|a, b| a.0.cmp(&b.0));
        Err(Error::Staging {
            failures: self.failures,
        })
    }
}

/// Records one worker's outcome. The accumulator is only ever appended to,
/// so a lock poisoned by another worker still holds consistent results.
fn record_locked(results: &Mutex<StageResults>, dir: &str, outcome: Result<StagedDependency>) {
    results
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .record(dir, outcome);
}

fn verify_subtree(staging: &Path, subtree: &Path) -> Result<()> {
    let path = staging.join(subtree);
    match fs::metadata(&path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::Layout {
            path,
            message: "is not a dir".to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::Layout {
            path,
            message: "does not exist".to_string(),
        }),
        Err(e) => Err(Error::Io(e)),
    }
}

fn remove_staging_dir(staging: TempDir) {
    let path = staging.path().to_path_buf();
    debug!("Removing dir {:?}", path);
    if let Err(e) = staging.close() {
        warn!("Could not clean up dir {:?}: {}", path, e);
    }
}

/// Name of the invoking user, safe to embed in a directory name.
fn staging_user() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    sanitize_user(&user)
}

fn sanitize_user(user: &str) -> String {
    let cleaned: String = user.chars().filter(|c| *c != '/' && *c != '\\').collect();
    if cleaned.is_empty() {
        "unknown_user".to_string()
    } else {
        cleaned
    }
}
