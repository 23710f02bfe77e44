//! # Courier Library
//!
//! This library vendors external source trees, fetched with git or svn, into
//! a repository. It is designed to be used by the `courier` command-line tool
//! but every step is usable on its own.
//!
//! ## Quick Example
//!
//! ```
//! use courier::manifest::Manifest;
//!
//! let manifest = Manifest::parse(r#"{
//!     "third_party/zlib": {"vcs": "git", "url": "https://example.com/zlib.git", "ref": "v1.3", "dir": "."}
//! }"#).unwrap();
//!
//! let zlib = manifest.get("third_party/zlib").unwrap();
//! assert_eq!(zlib.ignore_name(), ".git");
//! assert_eq!(zlib.revision(), Some("v1.3"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: destination directory → dependency, loaded
//!   from and saved as JSON.
//! - **Backends (`backend`, `git`, `svn`)**: fetch a dependency and report
//!   the exact revision that was fetched.
//! - **Staging (`stage`)**: fetches every dependency concurrently into its
//!   own temporary directory, all or nothing.
//! - **Fingerprints (`walk`, `dirhash`)**: a deterministic SHA-1 over a
//!   directory tree, independent of where the tree lives.
//! - **Copying (`copy`)**: mirrors a staged tree into its destination.
//! - **Reconciliation (`reconcile`)**: copies only what changed and writes
//!   the pinned manifest.
//!
//! ## Execution Flow
//!
//! [`reconcile::run`] drives a complete run:
//!
//! 1.  **Load**: parse the primary manifest (or the pinned one when
//!     reproducing).
//! 2.  **Stage**: fetch every dependency in parallel; any failure discards
//!     everything.
//! 3.  **Reconcile**: fingerprint each staged tree and its destination, and
//!     copy when they differ.
//! 4.  **Pin**: save the revisions that were fetched, unless reproducing.

pub mod backend;
pub mod config;
pub mod copy;
pub mod dirhash;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod reconcile;
pub mod stage;
pub mod svn;
pub mod walk;

#[cfg(test)]
mod dirhash_proptest;
