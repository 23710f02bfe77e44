//! Mirrors a source tree into a destination, replacing whatever was there.
//!
//! The walk is the same one the hasher uses, so a successful copy always
//! hashes like its source. The copy is not atomic: a failure part way leaves a
//! partially written destination behind.

use std::fs::{self, File, Permissions};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::walk::{walk_tree, EntryKind};

/// Replaces `dst` with a copy of `src`, leaving out directories named
/// `ignore_name`.
///
/// Symlinks in `src` are copied as the files or directories they point to.
/// Permission bits are preserved; directory permissions are applied once the
/// directory's contents have been written.
pub fn copy_dir(src: &Path, dst: &Path, ignore_name: &str) -> Result<()> {
    debug!("Copying directory contents from {:?} to {:?}", src, dst);

    remove_existing(dst);

    let mut dir_permissions: Vec<(PathBuf, Permissions)> = Vec::new();
    walk_tree(src, ignore_name, |entry| {
        let target = dst.join(&entry.relative);
        match entry.kind {
            EntryKind::Dir => {
                debug!("Creating dir {:?}", target);
                fs::create_dir_all(&target)?;
                dir_permissions.push((target, entry.metadata.permissions()));
            }
            EntryKind::File => {
                debug!("Copying file from {:?} to {:?}", entry.resolved, target);
                let mut reader = File::open(&entry.resolved)?;
                let mut writer = File::create(&target)?;
                io::copy(&mut reader, &mut writer)?;
                fs::set_permissions(&target, entry.metadata.permissions())?;
            }
        }
        Ok(())
    })?;

    for (dir, permissions) in dir_permissions.into_iter().rev() {
        fs::set_permissions(&dir, permissions)?;
    }

    Ok(())
}

/// Best-effort removal of whatever is at `path`, directory or not.
///
/// A missing path is fine; any real problem shows up when the copy starts.
fn remove_existing(path: &Path) {
    let removed = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match removed {
        Ok(()) => debug!("Removed existing {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => debug!("Could not remove {:?}: {}", path, e),
    }
}
