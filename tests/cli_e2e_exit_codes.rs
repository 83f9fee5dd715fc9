//! End-to-end tests for CLI exit codes and error messages.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any error that aborts a run
//! - Exit code 2: Invalid command-line usage (handled by clap)
//!
//! None of these reach the network: every failing case stops before a
//! request is made.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("catalog-sync");
    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("normalize"))
        .stdout(predicate::str::contains("push-resource"));
}

#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("catalog-sync");
    cmd.arg("--version").assert().code(0);
}

#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("catalog-sync");
    cmd.arg("frobnicate").assert().code(2);
}

#[test]
fn test_config_not_found() {
    TestFixture::new()
        .command()
        .args(["normalize", "--api-token", "secret"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("CATALOG_SYNC_CONFIG"));
}

#[test]
fn test_explicit_config_not_found() {
    TestFixture::new()
        .command()
        .args(["--config", "missing.yaml", "stats"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.yaml"));
}

#[test]
fn test_invalid_yaml() {
    TestFixture::new()
        .with_config(configs::INVALID_YAML)
        .command()
        .arg("stats")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML"));
}

#[test]
fn test_invalid_config_shows_hint() {
    TestFixture::new()
        .with_config(configs::EMPTY_ORGANIZATION)
        .command()
        .arg("stats")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("remote.organization is empty"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_missing_api_token() {
    for workflow in ["normalize", "compare", "pull", "push"] {
        TestFixture::new()
            .with_minimal_config()
            .command()
            .arg(workflow)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No API token"))
            .stderr(predicate::str::contains("TRANSIFEX_API_TOKEN"));
    }
}

#[test]
fn test_push_resource_requires_slug() {
    TestFixture::new()
        .with_minimal_config()
        .command()
        .arg("push-resource")
        .assert()
        .code(2);
}

#[test]
fn test_push_force_without_tty_fails_before_connecting() {
    TestFixture::new()
        .with_minimal_config()
        .command()
        .args(["push", "--force", "--api-token", "secret"])
        .write_stdin("")
        .assert()
        .failure();
}
