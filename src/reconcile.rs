//! # Reconciliation
//!
//! Brings destinations in line with what was just staged, and drives a whole
//! run from manifest to pinned manifest.
//!
//! A destination is only rewritten when its fingerprint differs from the
//! staged tree's. An unchanged destination is not touched at all, so tools
//! watching modification times do not see spurious changes. With
//! `force_copy` the comparison is skipped and every destination is rewritten.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::RunOptions;
use crate::copy::copy_dir;
use crate::dirhash::hash_dir;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::stage::{StagedDependency, Stager};

/// What happened to one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The destination differed (or was missing) and was replaced.
    Copied,
    /// The destination was replaced without comparing.
    Forced,
    /// The destination already matched and was left alone.
    Unchanged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Copied => "copied",
            Outcome::Forced => "copied (forced)",
            Outcome::Unchanged => "unchanged",
        };
        f.write_str(text)
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Outcome per destination directory, as named in the manifest.
    pub outcomes: BTreeMap<String, Outcome>,
    /// Where the pinned manifest was saved; `None` in reproduce mode.
    pub pins_written: Option<PathBuf>,
}

impl RunSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

/// Reconciles the destination `dest` (named `dir` in the manifest) with a
/// staged dependency.
pub fn reconcile_one(
    dir: &str,
    staged: &StagedDependency,
    dest: &Path,
    force_copy: bool,
) -> Result<Outcome> {
    let ignore_name = staged.pinned().ignore_name();
    let source = staged.source_dir();

    if force_copy {
        info!("Copying dependency {:?} (forced)", dir);
        copy_dir(&source, dest, ignore_name)?;
        return Ok(Outcome::Forced);
    }

    let staged_hash = hash_dir(&source, ignore_name)?;
    let current_hash = match hash_dir(dest, ignore_name) {
        Ok(hash) => Some(hash),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    if current_hash == Some(staged_hash) {
        info!("Skipping copying dependency {:?} (unchanged)", dir);
        return Ok(Outcome::Unchanged);
    }

    info!("Copying dependency {:?}", dir);
    copy_dir(&source, dest, ignore_name)?;
    Ok(Outcome::Copied)
}

/// Reconciles every staged dependency, one destination at a time.
pub fn reconcile(
    staged: &BTreeMap<String, StagedDependency>,
    options: &RunOptions,
) -> Result<BTreeMap<String, Outcome>> {
    staged
        .iter()
        .map(|(dir, staged)| {
            let outcome =
                reconcile_one(dir, staged, &options.destination(dir), options.force_copy)?;
            Ok((dir.clone(), outcome))
        })
        .collect()
}

/// The manifest recording exactly what was staged.
pub fn pinned_manifest(staged: &BTreeMap<String, StagedDependency>) -> Manifest {
    staged
        .iter()
        .map(|(dir, staged)| (dir.clone(), staged.pinned().clone()))
        .collect()
}

/// Runs the whole pipeline: load, stage, reconcile, pin.
///
/// Staging directories are removed before returning, whether the run
/// succeeded or not.
pub fn run(options: &RunOptions, stager: &Stager) -> Result<RunSummary> {
    let manifest_path = options.manifest_path();
    info!("Using manifest {:?}", manifest_path);
    let manifest = Manifest::from_file(manifest_path)?;

    let staged = stager.stage(&manifest)?;
    let result = reconcile_and_pin(&staged, options);

    for (_, staged) in staged {
        staged.cleanup();
    }

    if result.is_ok() {
        info!("Finished!");
    }
    result
}

fn reconcile_and_pin(
    staged: &BTreeMap<String, StagedDependency>,
    options: &RunOptions,
) -> Result<RunSummary> {
    let outcomes = reconcile(staged, options)?;

    let pins_written = if options.reproduce {
        None
    } else {
        info!("Saving pinned manifest to {:?}", options.pinned_manifest);
        pinned_manifest(staged).write_to(&options.pinned_manifest)?;
        Some(options.pinned_manifest.clone())
    };

    Ok(RunSummary {
        outcomes,
        pins_written,
    })
}
