//! Git branch lookup for prompt decoration.

use std::path::Path;
use std::process::{Command, Stdio};

/// Current branch name for `cwd`, the short commit hash when HEAD is
/// detached, or `None` outside a repository.
pub fn current_branch(cwd: &Path) -> Option<String> {
    let branch = git_line(cwd, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    if branch != "HEAD" {
        return Some(branch);
    }
    // Detached HEAD: fall back to the short hash.
    Some(git_line(cwd, &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "detached".into()))
}

fn git_line(cwd: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let line = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
