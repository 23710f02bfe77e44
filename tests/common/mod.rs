//! Shared test utilities for E2E tests.
//!
//! This module provides a fixture directory to run `courier` in and helpers
//! for building local git repositories to vendor from.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest("{}");
//!     fixture.command().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, GitRepo};
    pub use super::TestFixture;
}

/// Check whether the `git` binary can be run.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A working directory in which `courier` is run.
///
/// Staging directories go to a `staging/` directory inside the fixture so
/// tests can check that nothing is left behind.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty working directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("work/staging")
            .create_dir_all()
            .expect("Failed to create staging directory");
        Self { temp_dir }
    }

    /// Write `deps.json` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("deps.json", content)
    }

    /// Add a file, relative to the working directory.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// The working directory `courier` runs in.
    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// A scratch directory outside the working directory, for upstreams.
    #[allow(dead_code)]
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a child path in the working directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("work").child(path)
    }

    /// Read a file in the working directory.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Number of entries left in the staging directory.
    #[allow(dead_code)]
    pub fn staging_entries(&self) -> usize {
        std::fs::read_dir(self.path().join("staging"))
            .expect("Failed to read staging directory")
            .count()
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("courier");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("COURIER_PRIMARY_MANIFEST")
            .env_remove("COURIER_PINNED_MANIFEST")
            .env("COURIER_STAGING_ROOT", self.path().join("staging"))
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A local git repository to vendor from.
#[allow(dead_code)]
pub struct GitRepo {
    path: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    /// Initialise an empty repository at `path`.
    pub fn init(path: &Path) -> Self {
        std::fs::create_dir_all(path).expect("Failed to create repository directory");
        let repo = Self {
            path: path.to_path_buf(),
        };
        repo.git(&["init", "--quiet"]);
        repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URL usable in a manifest, JSON-escaped and quoted.
    pub fn json_url(&self) -> String {
        serde_json::to_string(&self.path.to_string_lossy()).expect("Failed to quote path")
    }

    /// Write a file in the working tree.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(path, content).expect("Failed to write file");
        self
    }

    /// Commit everything and return the new commit hash.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Hash of the commit currently checked out.
    pub fn commit_hash(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Point tag `name` at the current commit, moving it if it exists.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", "--force", name]);
    }

    fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .env("GIT_AUTHOR_NAME", "Courier Tests")
            .env("GIT_AUTHOR_EMAIL", "tests@example.com")
            .env("GIT_COMMITTER_NAME", "Courier Tests")
            .env("GIT_COMMITTER_EMAIL", "tests@example.com")
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_work_and_staging() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
        assert_eq!(fixture.staging_entries(), 0);
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest("{}");
        assert!(fixture.path().join("deps.json").exists());
    }
}
