use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Clone `url` into `dir`.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Any authentication configured in ~/.gitconfig
///
/// `dir` may already exist as long as it is empty, which is the case for a
/// fresh staging directory.
pub fn clone_repo(dir: &Path, url: &str) -> Result<()> {
    debug!("Performing Git Clone from {:?} to {:?}", url, dir);
    let mut cmd = Command::new("git");
    cmd.args(["clone", "--", url]).arg(dir);
    run_tool(cmd, "git", &format!("clone {}", url), dir).map(drop)
}

/// Check out `ref_name` (branch, tag or commit) in the clone at `dir`.
///
/// A ref starting with `-` is refused: git would parse it as an option.
pub fn checkout(dir: &Path, ref_name: &str) -> Result<()> {
    debug!("Performing Git Checkout in {:?} to {:?}", dir, ref_name);
    let command = format!("checkout {}", ref_name);
    if ref_name.starts_with('-') {
        return Err(Error::Fetch {
            tool: "git".to_string(),
            command,
            dir: dir.to_path_buf(),
            status: "refused".to_string(),
            output: "refs must not start with '-'".to_string(),
        });
    }
    let mut cmd = Command::new("git");
    cmd.args(["checkout", ref_name, "--"]).current_dir(dir);
    run_tool(cmd, "git", &command, dir).map(drop)
}

/// Full hash of the commit checked out at `dir`.
pub fn current_commit(dir: &Path) -> Result<String> {
    debug!("Performing Git Rev-Parse in {:?}", dir);
    let mut cmd = Command::new("git");
    cmd.args(["rev-parse", "HEAD"]).current_dir(dir);
    run_tool(cmd, "git", "rev-parse HEAD", dir)
}

/// Run a version-control tool and return its trimmed combined output.
///
/// On failure the error carries the exit status and the same combined output,
/// which is usually the only useful diagnostic these tools give.
pub(crate) fn run_tool(mut cmd: Command, tool: &str, command: &str, dir: &Path) -> Result<String> {
    let fetch_error = |status: String, output: String| Error::Fetch {
        tool: tool.to_string(),
        command: command.to_string(),
        dir: dir.to_path_buf(),
        status,
        output,
    };

    let output = cmd
        .output()
        .map_err(|e| fetch_error("could not be started".to_string(), e.to_string()))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = combined.trim().to_string();

    if !output.status.success() {
        return Err(fetch_error(output.status.to_string(), combined));
    }

    Ok(combined)
}
