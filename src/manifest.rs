//! # Manifest and Dependency Model
//!
//! A manifest maps destination directories to the external source tree that
//! should be vendored there. The same JSON shape is used for the primary
//! manifest (symbolic refs such as `main`) and the pinned manifest (concrete
//! commit hashes and revision numbers):
//!
//! ```json
//! {
//!     "third_party/zlib": {"vcs": "git", "url": "https://...", "ref": "v1.3", "dir": "."},
//!     "third_party/tool": {"vcs": "svn", "url": "https://...", "rev": "1207"}
//! }
//! ```
//!
//! Loading is strict about what a dependency needs (`vcs` plus the fields of
//! that variant) and lenient about anything else: unknown keys are logged and
//! dropped. Malformed JSON is reported with the line, column and source text
//! where the parser gave up.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use serde_json::error::Category;
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};

/// Directory name excluded from hashing and copying for git checkouts.
pub const GIT_IGNORE_NAME: &str = ".git";
/// Directory name excluded from hashing and copying for svn checkouts.
pub const SVN_IGNORE_NAME: &str = ".svn";

/// A dependency fetched with git.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitDependency {
    pub url: String,
    /// Branch, tag or commit. Always a full commit hash once pinned.
    pub r#ref: String,
    /// Subdirectory of the clone that is copied to the destination.
    pub dir: String,
}

/// A dependency fetched with svn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvnDependency {
    pub url: String,
    /// Revision to check out; `None` means the latest one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "vcs", rename_all = "lowercase")]
pub enum Dependency {
    Git(GitDependency),
    Svn(SvnDependency),
}

impl Dependency {
    /// Name of the VCS metadata directory that never takes part in hashing or
    /// copying.
    pub fn ignore_name(&self) -> &'static str {
        match self {
            Dependency::Git(_) => GIT_IGNORE_NAME,
            Dependency::Svn(_) => SVN_IGNORE_NAME,
        }
    }

    /// Path, relative to the fetched tree, that is copied to the destination.
    ///
    /// Empty for svn: the whole checkout is copied.
    pub fn subtree_to_copy(&self) -> &Path {
        match self {
            Dependency::Git(git) => Path::new(&git.dir),
            Dependency::Svn(_) => Path::new(""),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Dependency::Git(git) => &git.url,
            Dependency::Svn(svn) => &svn.url,
        }
    }

    /// The requested revision, if any.
    pub fn revision(&self) -> Option<&str> {
        match self {
            Dependency::Git(git) => Some(&git.r#ref),
            Dependency::Svn(svn) => svn.rev.as_deref(),
        }
    }

    /// Returns a copy of this dependency pinned to `revision`.
    pub fn pinned(&self, revision: impl Into<String>) -> Dependency {
        match self {
            Dependency::Git(git) => Dependency::Git(GitDependency {
                r#ref: revision.into(),
                ..git.clone()
            }),
            Dependency::Svn(svn) => Dependency::Svn(SvnDependency {
                rev: Some(revision.into()),
                ..svn.clone()
            }),
        }
    }

    pub fn vcs(&self) -> &'static str {
        match self {
            Dependency::Git(_) => "git",
            Dependency::Svn(_) => "svn",
        }
    }

    fn from_fields(dir: &str, mut fields: BTreeMap<String, String>) -> Result<Self> {
        let vcs = fields.remove("vcs").ok_or_else(|| Error::ManifestFormat {
            message: format!("missing required key 'vcs' in dependency '{}'", dir),
            hint: Some("add \"vcs\": \"git\" or \"vcs\": \"svn\"".to_string()),
        })?;

        let dependency = match vcs.as_str() {
            "git" => Dependency::Git(GitDependency {
                url: take_required(&mut fields, dir, "url")?,
                r#ref: take_required(&mut fields, dir, "ref")?,
                dir: take_required(&mut fields, dir, "dir")?,
            }),
            "svn" => Dependency::Svn(SvnDependency {
                url: take_required(&mut fields, dir, "url")?,
                rev: fields.remove("rev"),
            }),
            other => {
                return Err(Error::ManifestFormat {
                    message: format!("unknown dependency vcs '{}' in dependency '{}'", other, dir),
                    hint: Some("supported values are \"git\" and \"svn\"".to_string()),
                })
            }
        };

        for (key, value) in &fields {
            warn!(
                "Ignoring unknown key value pair {:?}:{:?} in dependency {:?}",
                key, value, dir
            );
        }

        Ok(dependency)
    }
}

fn take_required(fields: &mut BTreeMap<String, String>, dir: &str, key: &str) -> Result<String> {
    fields.remove(key).ok_or_else(|| Error::ManifestFormat {
        message: format!("missing required key '{}' in dependency '{}'", key, dir),
        hint: None,
    })
}

/// Destination directory → dependency.
///
/// Backed by an ordered map so that the pinned manifest serializes the same
/// way on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, Dependency>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a manifest from JSON text.
    pub fn parse(source: &str) -> Result<Self> {
        debug!("Loading manifest {:?}", source);

        let raw: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(source).map_err(|e| enrich_json_error(e, source))?;

        let entries = raw
            .into_iter()
            .map(|(dir, fields)| {
                let dependency = Dependency::from_fields(&dir, fields)?;
                Ok((dir, dependency))
            })
            .collect::<Result<_>>()?;

        Ok(Self { entries })
    }

    /// Reads and parses a manifest file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Pretty-printed JSON (tab indented) with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        buf.push(b'\n');
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn insert(&mut self, dir: impl Into<String>, dependency: Dependency) {
        self.entries.insert(dir.into(), dependency);
    }

    pub fn get(&self, dir: &str) -> Option<&Dependency> {
        self.entries.get(dir)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Dependency)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Dependency)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, Dependency)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Turns a `serde_json` error into a manifest error.
///
/// Syntax errors (including unexpected end of input) get the offending line
/// attached; errors about the shape of otherwise valid JSON become
/// `ManifestFormat`.
pub fn enrich_json_error(err: serde_json::Error, source: &str) -> Error {
    match err.classify() {
        Category::Syntax | Category::Eof => Error::ManifestSyntax {
            line: err.line(),
            column: err.column(),
            excerpt: source_line(source, err.line()),
            message: err.to_string(),
        },
        Category::Data => Error::ManifestFormat {
            message: err.to_string(),
            hint: Some(
                "the manifest must be an object of objects with string values".to_string(),
            ),
        },
        Category::Io => Error::Json(err),
    }
}

/// The 1-based `line` of `source`, trimmed of blanks, tabs and carriage
/// returns. Empty when the line does not exist.
pub fn source_line(source: &str, line: usize) -> String {
    line.checked_sub(1)
        .and_then(|index| source.split('\n').nth(index))
        .map(|text| text.trim_matches(|c| c == ' ' || c == '\t' || c == '\r'))
        .unwrap_or_default()
        .to_string()
}
