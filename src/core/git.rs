//! Git context capture: working-tree diff, diff between two refs and the
//! one-line log between them.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run `git -C <repo> <args>` and return stdout; non-zero exit is an error
/// carrying git's stderr.
fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    debug!(repo = %repo.display(), ?args, "running git");

    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .context("Failed to execute git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Unstaged changes in the working tree.
pub fn diff(repo: &Path) -> Result<String> {
    run_git(repo, &["diff"]).context("Failed to get git diff")
}

/// `git diff a..b`
///
/// Refs come from the user, so option parsing is closed before the range.
pub fn diff_between(repo: &Path, a: &str, b: &str) -> Result<String> {
    let range = format!("{a}..{b}");
    run_git(repo, &["diff", "--end-of-options", &range])
        .context("Failed to get git diff between branches")
}

/// `git log --oneline a..b`
pub fn log_between(repo: &Path, a: &str, b: &str) -> Result<String> {
    let range = format!("{a}..{b}");
    run_git(repo, &["log", "--oneline", "--end-of-options", &range]).context("Failed to get git log")
}

/// Split `"main,feature"` into its two branch names.
pub fn parse_branch_pair(spec: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();

    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => bail!("please provide exactly two branches separated by a comma"),
    }
}
