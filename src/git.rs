//! Thin wrappers around the system `git` command.
//!
//! Using the system binary means SSH keys, credential helpers and anything
//! else configured in `~/.gitconfig` apply to fetch and push without extra
//! setup.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Run `git {args}` in `dir` and return trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let stderr = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you can push to the data repository:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitCommand {
            command: args.join(" "),
            path: dir.to_path_buf(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Whether `git {args}` exits successfully. Never fails for a non-zero exit.
fn git_succeeds(dir: &Path, args: &[&str]) -> Result<bool> {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            path: dir.to_path_buf(),
            stderr: e.to_string(),
        })?
        .status;
    Ok(status.success())
}

/// Tracked files have uncommitted changes. Untracked files are ignored.
pub fn is_dirty(dir: &Path) -> Result<bool> {
    let status = run_git(dir, &["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!status.is_empty())
}

/// Whether anything changed under `relpath`, untracked files included.
pub fn has_changes_under(dir: &Path, relpath: &str) -> Result<bool> {
    let status = run_git(dir, &["status", "--porcelain", "--untracked-files=all", "--", relpath])?;
    Ok(!status.is_empty())
}

pub fn fetch(dir: &Path, remote: &str) -> Result<()> {
    run_git(dir, &["fetch", "--quiet", remote])?;
    Ok(())
}

pub fn local_branch_exists(dir: &Path, name: &str) -> Result<bool> {
    git_succeeds(
        dir,
        &["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", name)],
    )
}

pub fn remote_branch_exists(dir: &Path, remote: &str, name: &str) -> Result<bool> {
    git_succeeds(
        dir,
        &[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/remotes/{}/{}", remote, name),
        ],
    )
}

pub fn current_branch(dir: &Path) -> Result<String> {
    run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Check out `name`, matching its upstream when there is one.
///
/// - local branch exists: check it out and reset it to the upstream tip
///   when the remote has the same branch,
/// - only the remote has it: create a tracking branch,
/// - neither: branch from `{remote}/{base}` without tracking.
pub fn checkout_or_create_branch(dir: &Path, remote: &str, name: &str, base: &str) -> Result<()> {
    let upstream = format!("{}/{}", remote, name);
    let has_remote = remote_branch_exists(dir, remote, name)?;

    if local_branch_exists(dir, name)? {
        run_git(dir, &["checkout", "--quiet", "--force", name])?;
        if has_remote {
            run_git(dir, &["reset", "--quiet", "--hard", &upstream])?;
        }
    } else if has_remote {
        run_git(dir, &["checkout", "--quiet", "-b", name, "--track", &upstream])?;
    } else {
        let start = format!("{}/{}", remote, base);
        run_git(dir, &["checkout", "--quiet", "--no-track", "-b", name, &start])?;
    }
    Ok(())
}

/// Stage everything under `relpath` (new files included) and commit.
pub fn commit_all(dir: &Path, relpath: &str, message: &str) -> Result<()> {
    run_git(dir, &["add", "--all", "--force", "--", relpath])?;
    run_git(dir, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Push the current branch and set its upstream.
pub fn push_current_branch(dir: &Path, remote: &str) -> Result<()> {
    let branch = current_branch(dir)?;
    run_git(dir, &["push", "--quiet", "-u", remote, &branch])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        run_git(dir, &["init", "--quiet", "--initial-branch=main"]).unwrap();
        run_git(dir, &["config", "user.email", "sync@example.com"]).unwrap();
        run_git(dir, &["config", "user.name", "Sync Test"]).unwrap();
        fs::write(dir.join("README"), "data\n").unwrap();
        run_git(dir, &["add", "README"]).unwrap();
        run_git(dir, &["commit", "--quiet", "-m", "initial"]).unwrap();
        temp
    }

    #[test]
    fn test_run_git_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        let result = run_git(temp.path(), &["status", "--porcelain"]);
        match result {
            Err(Error::GitCommand { command, .. }) => assert_eq!(command, "status --porcelain"),
            Ok(_) => {
                // A parent directory of the temp dir is a repository.
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_is_dirty_tracks_modifications_only() {
        let temp = init_repo();
        let dir = temp.path();
        assert!(!is_dirty(dir).unwrap());

        fs::write(dir.join("untracked.po"), "x").unwrap();
        assert!(!is_dirty(dir).unwrap());
        assert!(has_changes_under(dir, ".").unwrap());

        fs::write(dir.join("README"), "changed\n").unwrap();
        assert!(is_dirty(dir).unwrap());
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_commit_all_cleans_working_copy() {
        let temp = init_repo();
        let dir = temp.path();
        fs::create_dir_all(dir.join("locale")).unwrap();
        fs::write(dir.join("locale/de.po"), "x").unwrap();
        fs::write(dir.join("README"), "changed\n").unwrap();

        commit_all(dir, ".", "Update translations").unwrap();
        assert!(!is_dirty(dir).unwrap());
        assert!(!has_changes_under(dir, ".").unwrap());
        assert_eq!(current_branch(dir).unwrap(), "main");
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_local_branch_exists() {
        let temp = init_repo();
        let dir = temp.path();
        assert!(local_branch_exists(dir, "main").unwrap());
        assert!(!local_branch_exists(dir, "translations").unwrap());
        assert!(!remote_branch_exists(dir, "origin", "main").unwrap());
    }
}
