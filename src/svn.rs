use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::Result;
use crate::git::run_tool;

/// Check out the head revision of `url` into `dir`.
pub fn checkout_latest(dir: &Path, url: &str) -> Result<()> {
    debug!("Performing SVN Checkout Latest from {:?} to {:?}", url, dir);
    let mut cmd = Command::new("svn");
    cmd.args(["checkout", "--non-interactive", url]).arg(dir);
    run_tool(cmd, "svn", &format!("checkout {}", url), dir).map(drop)
}

/// Check out `url` at revision `rev` into `dir`.
pub fn checkout_at_rev(dir: &Path, url: &str, rev: &str) -> Result<()> {
    debug!(
        "Performing SVN Checkout from {:?} at {:?} to {:?}",
        url, rev, dir
    );
    let mut cmd = Command::new("svn");
    cmd.args(["checkout", "--non-interactive", "--revision", rev, url])
        .arg(dir);
    run_tool(cmd, "svn", &format!("checkout -r {} {}", rev, url), dir).map(drop)
}

/// Revision of the working copy at `dir`, as reported by `svnversion`.
pub fn working_revision(dir: &Path) -> Result<String> {
    debug!("Performing SVN version in {:?}", dir);
    let mut cmd = Command::new("svnversion");
    cmd.current_dir(dir);
    run_tool(cmd, "svnversion", "svnversion", dir)
}
