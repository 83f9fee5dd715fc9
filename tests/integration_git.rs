//! Integration tests for [`GitRepository`] against real git repositories.
//!
//! These tests require the `git` binary and are only run when the
//! `integration-tests` feature is enabled:
//!
//! ```bash
//! cargo test --test integration_git --features integration-tests
//! ```

use std::fs;
use std::path::Path;

use catalog_sync::config::GitConfig;
use catalog_sync::git::run_git;
use catalog_sync::repository::{GitRepository, Repository};
use tempfile::TempDir;

/// A working copy at `work/` whose `origin` is the bare repo `origin.git/`.
fn working_copy(temp: &TempDir) -> std::path::PathBuf {
    let origin = temp.path().join("origin.git");
    let work = temp.path().join("work");
    fs::create_dir_all(&origin).unwrap();
    fs::create_dir_all(&work).unwrap();

    run_git(&origin, &["init", "--quiet", "--bare"]).unwrap();
    run_git(&work, &["init", "--quiet"]).unwrap();
    run_git(&work, &["checkout", "--quiet", "-b", "main"]).unwrap();
    run_git(&work, &["config", "user.email", "sync@example.org"]).unwrap();
    run_git(&work, &["config", "user.name", "Sync Bot"]).unwrap();
    run_git(&work, &["config", "commit.gpgsign", "false"]).unwrap();

    fs::write(work.join("README.md"), "data\n").unwrap();
    run_git(&work, &["add", "README.md"]).unwrap();
    run_git(&work, &["commit", "--quiet", "-m", "Initial"]).unwrap();
    run_git(&work, &["remote", "add", "origin", &origin.to_string_lossy()]).unwrap();
    run_git(&work, &["push", "--quiet", "-u", "origin", "main"]).unwrap();
    work
}

fn settings() -> GitConfig {
    GitConfig {
        remote: "origin".to_string(),
        base_branch: "main".to_string(),
        push: true,
    }
}

fn write_catalog(work: &Path, content: &str) {
    let dir = work.join("locale/de/LC_MESSAGES");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("django.po"), content).unwrap();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_dirty_detection_ignores_untracked_files() {
    let temp = TempDir::new().unwrap();
    let work = working_copy(&temp);
    let repository = GitRepository::new(&work, settings());

    assert!(!repository.is_dirty().unwrap());
    write_catalog(&work, "msgid \"\"\nmsgstr \"\"\n");
    assert!(!repository.is_dirty().unwrap());
    assert!(repository.has_changes().unwrap());

    fs::write(work.join("README.md"), "changed\n").unwrap();
    assert!(repository.is_dirty().unwrap());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_branch_commit_and_push_round_trip() {
    let temp = TempDir::new().unwrap();
    let work = working_copy(&temp);
    let repository = GitRepository::new(&work, settings());

    repository.fetch().unwrap();
    repository.checkout_or_create_branch("translations").unwrap();
    assert_eq!(
        run_git(&work, &["rev-parse", "--abbrev-ref", "HEAD"]).unwrap(),
        "translations"
    );

    write_catalog(&work, "msgid \"\"\nmsgstr \"Language: de\\n\"\n");
    repository
        .commit_and_push("Update translations from creativecommons/CC")
        .unwrap();
    assert!(!repository.has_changes().unwrap());

    let origin = temp.path().join("origin.git");
    let subject = run_git(&origin, &["log", "-1", "--format=%s", "translations"]).unwrap();
    assert_eq!(subject, "Update translations from creativecommons/CC");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_existing_remote_branch_is_tracked() {
    let temp = TempDir::new().unwrap();
    let work = working_copy(&temp);
    run_git(&work, &["push", "--quiet", "origin", "main:translations"]).unwrap();
    let repository = GitRepository::new(&work, settings());

    repository.fetch().unwrap();
    repository.checkout_or_create_branch("translations").unwrap();
    let upstream = run_git(
        &work,
        &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
    )
    .unwrap();
    assert_eq!(upstream, "origin/translations");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_commit_without_push_stays_local() {
    let temp = TempDir::new().unwrap();
    let work = working_copy(&temp);
    let repository = GitRepository::new(
        &work,
        GitConfig {
            push: false,
            ..settings()
        },
    );

    write_catalog(&work, "msgid \"\"\nmsgstr \"\"\n");
    repository.commit_and_push("Local only").unwrap();

    let origin = temp.path().join("origin.git");
    let subject = run_git(&origin, &["log", "-1", "--format=%s", "main"]).unwrap();
    assert_eq!(subject, "Initial");
}
