//! # Error Handling
//!
//! This module defines the centralized error type for `courier`. It uses the
//! `thiserror` library to describe every anticipated failure mode of a run,
//! from loading the manifest through staging, hashing and copying.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum of failures. Each variant carries the context
//!   an operator needs to act on it (paths, tool output, offending source
//!   line).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library.
//!
//! Errors fall into a few groups:
//!
//! - Manifest errors (`ManifestSyntax`, `ManifestFormat`), fatal before any
//!   staging begins.
//! - Per-dependency staging errors (`Fetch`, `Layout`), which are collected
//!   into a single `Staging` error once every worker has finished.
//! - Tree errors (`NotFound`, `UnsupportedEntry`, `Io`, `Walk`) raised while
//!   hashing or copying.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for courier operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest is not well-formed JSON.
    ///
    /// `line` and `column` are 1-based; `excerpt` is the offending source line
    /// with surrounding whitespace trimmed.
    #[error("{message}\nOccurred on line {line} at pos {column}: {excerpt}")]
    ManifestSyntax {
        message: String,
        line: usize,
        column: usize,
        excerpt: String,
    },

    /// The manifest is valid JSON but does not describe a set of dependencies.
    #[error("Manifest format error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestFormat {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// A version-control tool invocation failed.
    ///
    /// `output` holds the combined stdout and stderr of the tool.
    #[error("{tool} {command} failed in {}: {status}: {output}", dir.display())]
    Fetch {
        tool: String,
        command: String,
        dir: PathBuf,
        status: String,
        output: String,
    },

    /// The fetched tree does not contain the declared subtree.
    #[error("Layout error: {} {message}", path.display())]
    Layout { path: PathBuf, message: String },

    /// The root of a hash or copy does not exist.
    #[error("No such file or directory: {}", path.display())]
    NotFound { path: PathBuf },

    /// An entry that is neither a directory nor a regular file.
    #[error("{} has unexpected file type {kind}. If it is a symlink please delete it manually and try again.", path.display())]
    UnsupportedEntry { path: PathBuf, kind: String },

    /// At least one dependency failed to stage; nothing was kept.
    #[error("failed to stage all dependencies:{}", StagingFailures(failures))]
    Staging { failures: Vec<(String, Error)> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true when the error means "the path does not exist".
    ///
    /// The reconciler relies on this to treat a missing destination as
    /// "different" rather than as a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Walk(e) => e
                .io_error()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound),
            _ => false,
        }
    }
}

struct StagingFailures<'a>(&'a [(String, Error)]);

impl fmt::Display for StagingFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dir, err) in self.0 {
            write!(f, "\n  {}: {}", dir, err)?;
        }
        Ok(())
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
