//! # Pull Command Implementation
//!
//! This module implements the `pull` subcommand: download every translation
//! in scope and overwrite the local catalog with it, writing the compiled
//! `.mo` next to each `.po`. A normalize pass over the same scope follows.
//!
//! With `--branch NAME` the working copy is fetched and `NAME` checked out
//! (created from the configured base branch when it does not exist) before
//! pulling, and any resulting changes are committed and pushed afterwards.

use anyhow::Result;
use clap::Args;

use catalog_sync::sync::orchestrator::Options;
use catalog_sync::sync::Workflow;

use super::{print_report, Globals, RemoteArgs, ScopeArgs, Session};

/// Overwrite local translations with the remote ones
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Log what would change without writing anything
    #[arg(short = 'n', long)]
    pub dryrun: bool,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Pull onto this branch, then commit and push
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Execute the `pull` command.
pub fn execute(globals: &Globals, args: PullArgs) -> Result<()> {
    let session = Session::open(globals, &args.remote)?;
    let options = Options {
        scope: args.scope.into(),
        branch: args.branch,
        ..Options::default()
    };
    let report = session.run(Workflow::Pull, &options, args.dryrun)?;
    print_report(globals, Workflow::Pull, args.dryrun, &report);
    Ok(())
}
