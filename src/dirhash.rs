//! # Directory Fingerprints
//!
//! `hash_dir` summarizes a directory tree in a single SHA-1 digest so that a
//! freshly fetched dependency can be compared with what is already vendored
//! without diffing file by file.
//!
//! For every entry visited by [`walk_tree`](crate::walk::walk_tree) the
//! digest is fed, in order:
//!
//! 1. the path relative to the root, `/`-separated (`.` for the root),
//! 2. the resolved type and permission bits (`-rw-r--r--`),
//! 3. for regular files, the file contents.
//!
//! Nothing about the absolute location of the tree goes into the digest, so
//! the same tree hashes identically wherever it lives. Changing a name, a
//! permission bit or a single byte of content changes the digest; anything
//! under a directory named like the ignore name is invisible.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use sha1::{Digest, Sha1};

use crate::error::Result;
use crate::walk::{walk_tree, EntryKind};

/// SHA-1 digest of a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 20]);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Fingerprints the tree at `root`, skipping directories named `ignore_name`.
///
/// A missing `root` yields an error for which
/// [`Error::is_not_found`](crate::error::Error::is_not_found) is true.
pub fn hash_dir(root: &Path, ignore_name: &str) -> Result<Fingerprint> {
    debug!("Creating directory hash for {:?}", root);

    let mut hasher = Sha1::new();
    walk_tree(root, ignore_name, |entry| {
        let key = entry.relative_key();
        let mode = entry.mode_string();

        debug!("Hashing filename: {:?}", String::from_utf8_lossy(&key));
        hasher.update(&key);
        debug!("Hashing the mode: {:?}", mode);
        hasher.update(mode.as_bytes());

        if entry.kind == EntryKind::File {
            debug!("Hashing contents of {:?}", entry.relative);
            let mut file = File::open(&entry.path)?;
            io::copy(&mut file, &mut hasher)?;
        }
        Ok(())
    })?;

    let mut digest = [0u8; 20];
    digest.copy_from_slice(&hasher.finalize());
    let fingerprint = Fingerprint(digest);
    debug!("Hash for {:?}: {}", root, fingerprint);
    Ok(fingerprint)
}
