//! # Run Configuration
//!
//! `RunOptions` collects everything a single vendoring run needs to know:
//! which manifest to read, where to write pins, where destinations live and
//! how eager copying should be. The CLI builds one from its flags; tests
//! build them directly.

use std::path::{Path, PathBuf};

/// Manifest read in normal mode.
pub const DEFAULT_PRIMARY_MANIFEST: &str = "deps.json";

/// Manifest written after a normal run and read in reproduce mode.
pub const DEFAULT_PINNED_MANIFEST: &str = "pins.json";

/// Options for one run of [`reconcile::run`](crate::reconcile::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Manifest describing what to vendor.
    pub primary_manifest: PathBuf,
    /// Where the pinned manifest is written (or read, when reproducing).
    pub pinned_manifest: PathBuf,
    /// Read the pinned manifest and do not write a new one.
    pub reproduce: bool,
    /// Copy every dependency even when the destination already matches.
    pub force_copy: bool,
    /// Directory that manifest keys are resolved against.
    pub dest_root: PathBuf,
    /// Parent for staging directories; the system temp dir when unset.
    pub staging_root: Option<PathBuf>,
}

impl RunOptions {
    /// Options with default manifest names, resolving destinations against
    /// `dest_root`.
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            primary_manifest: PathBuf::from(DEFAULT_PRIMARY_MANIFEST),
            pinned_manifest: PathBuf::from(DEFAULT_PINNED_MANIFEST),
            reproduce: false,
            force_copy: false,
            dest_root: dest_root.into(),
            staging_root: None,
        }
    }

    /// The manifest to load: the pinned one when reproducing.
    pub fn manifest_path(&self) -> &Path {
        if self.reproduce {
            &self.pinned_manifest
        } else {
            &self.primary_manifest
        }
    }

    /// Where the destination for manifest key `dir` lives.
    pub fn destination(&self, dir: &str) -> PathBuf {
        self.dest_root.join(dir)
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(".")
    }
}
