//! # Compare Command Implementation
//!
//! This module implements the `compare` subcommand, a read-only report of
//! where local catalogs and the remote disagree. Sources are compared by
//! their message ids; translations by creation date, revision date, string
//! count and translated count. For every mismatch (or for everything, with
//! `--force`) a unified diff is printed to stdout.
//!
//! Diffs are plain text unless `--colordiff` is given, in which case they
//! are colored the way `colordiff` does regardless of `--color`.

use anyhow::Result;
use clap::Args;

use catalog_sync::sync::orchestrator::Options;
use catalog_sync::sync::Workflow;

use super::{print_report, Globals, RemoteArgs, ScopeArgs, Session};

/// Show where local catalogs and the remote differ
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Diff every catalog, even when the statistics match
    #[arg(long)]
    pub force: bool,

    /// Color the diffs
    #[arg(long)]
    pub colordiff: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Execute the `compare` command.
pub fn execute(globals: &Globals, args: CompareArgs) -> Result<()> {
    let session = Session::open(globals, &args.remote)?;
    let options = Options {
        scope: args.scope.into(),
        force: args.force,
        colordiff: args.colordiff,
        branch: None,
    };
    let report = session.run(Workflow::Compare, &options, false)?;
    print_report(globals, Workflow::Compare, false, &report);
    Ok(())
}
