//! Deterministic tree traversal shared by the hasher and the copier.
//!
//! Both must agree exactly on which entries exist and what they look like,
//! otherwise a copied tree would not hash like its source. The rule:
//!
//! 1. Entries are visited root first, then children in lexical order of their
//!    names at every level.
//! 2. Each entry is resolved through any symlinks and the *target* is
//!    inspected.
//! 3. A resolved directory whose own name is the ignore name is skipped along
//!    with everything below it. The name compared is the resolved target's,
//!    not the link's.
//! 4. Only directories and regular files are allowed; anything else aborts the
//!    walk.
//!
//! Symlinks to directories are reported as directories but are not descended
//! into.

use std::ffi::OsStr;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// What a visited entry resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

/// A visited entry, after symlink resolution.
#[derive(Debug)]
pub struct Entry {
    /// Path as found under the walk root.
    pub path: PathBuf,
    /// Path relative to the walk root; empty for the root itself.
    pub relative: PathBuf,
    /// Final target of `path` after following symlinks.
    pub resolved: PathBuf,
    /// Metadata of `resolved`.
    pub metadata: Metadata,
    pub kind: EntryKind,
}

impl Entry {
    /// Relative path with `/` separators, `.` for the root.
    pub fn relative_key(&self) -> Vec<u8> {
        relative_key(&self.relative)
    }

    /// Textual rendering of the resolved type and permission bits.
    pub fn mode_string(&self) -> String {
        mode_string(&self.metadata)
    }
}

/// Walks `root`, calling `visit` for every entry that is not excluded.
///
/// Fails with `Error::NotFound` if `root` itself does not exist.
pub fn walk_tree<F>(root: &Path, ignore_name: &str, mut visit: F) -> Result<()>
where
    F: FnMut(Entry) -> Result<()>,
{
    if let Err(e) = fs::metadata(root) {
        return Err(match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: root.to_path_buf(),
            },
            _ => Error::Io(e),
        });
    }

    let mut entries = WalkDir::new(root).sort_by_file_name().into_iter();
    while let Some(entry) = entries.next() {
        let entry = entry?;
        let path = entry.path();

        let resolved = match fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::UnsupportedEntry {
                    path: path.to_path_buf(),
                    kind: "broken symlink".to_string(),
                })
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let metadata = fs::metadata(&resolved)?;

        let kind = if metadata.is_dir() {
            EntryKind::Dir
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            return Err(Error::UnsupportedEntry {
                path: path.to_path_buf(),
                kind: mode_string(&metadata),
            });
        };

        if kind == EntryKind::Dir && resolved.file_name() == Some(OsStr::new(ignore_name)) {
            if entry.file_type().is_dir() {
                entries.skip_current_dir();
            }
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        visit(Entry {
            path: path.to_path_buf(),
            relative,
            resolved,
            metadata,
            kind,
        })?;
    }

    Ok(())
}

/// Joins the components of `relative` with `/`; `.` when there are none.
pub fn relative_key(relative: &Path) -> Vec<u8> {
    let mut key = Vec::new();
    for component in relative.components() {
        if !key.is_empty() {
            key.push(b'/');
        }
        key.extend_from_slice(&os_bytes(component.as_os_str()));
    }
    if key.is_empty() {
        key.push(b'.');
    }
    key
}

#[cfg(unix)]
fn os_bytes(s: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(s: &OsStr) -> Vec<u8> {
    s.to_string_lossy().into_owned().into_bytes()
}

/// Renders type and permission bits as `ls` does, e.g. `drwxr-xr-x`.
///
/// Special bits are prefixed as letters (`u` setuid, `g` setgid, `t` sticky);
/// a plain regular file gets `-`.
#[cfg(unix)]
pub fn mode_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};

    let file_type = metadata.file_type();
    let mode = metadata.permissions().mode();
    let mut out = String::with_capacity(12);

    if file_type.is_dir() {
        out.push('d');
    }
    if file_type.is_block_device() || file_type.is_char_device() {
        out.push('D');
    }
    if file_type.is_fifo() {
        out.push('p');
    }
    if file_type.is_socket() {
        out.push('S');
    }
    if mode & 0o4000 != 0 {
        out.push('u');
    }
    if mode & 0o2000 != 0 {
        out.push('g');
    }
    if file_type.is_char_device() {
        out.push('c');
    }
    if mode & 0o1000 != 0 {
        out.push('t');
    }
    if out.is_empty() {
        out.push('-');
    }

    const RWX: &[u8; 9] = b"rwxrwxrwx";
    for (i, c) in RWX.iter().enumerate() {
        if mode & (1 << (8 - i)) != 0 {
            out.push(*c as char);
        } else {
            out.push('-');
        }
    }
    out
}

#[cfg(not(unix))]
pub fn mode_string(metadata: &Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let perms = match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => "rwxrwxrwx",
        (false, true) => "r--r--r--",
        (false, false) => "rw-rw-rw-",
    };
    format!("{}{}", kind, perms)
}
