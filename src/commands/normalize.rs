//! # Normalize Command Implementation
//!
//! This module implements the `normalize` subcommand: for every resource and
//! language in scope, fill untranslated local entries from the remote (never
//! overwriting local work), bring the catalog headers to their canonical
//! values and reconcile the creation and revision dates with the remote.
//! Resources missing on the remote are created from the local source.
//!
//! With `--dryrun` nothing is written locally or remotely; every action that
//! would have happened is logged with a `<NOP>` prefix.

use anyhow::Result;
use clap::Args;

use catalog_sync::sync::orchestrator::Options;
use catalog_sync::sync::Workflow;

use super::{print_report, Globals, RemoteArgs, ScopeArgs, Session};

/// Fill local gaps from the remote and normalize headers and dates
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Log what would change without writing anything
    #[arg(short = 'n', long)]
    pub dryrun: bool,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Execute the `normalize` command.
pub fn execute(globals: &Globals, args: NormalizeArgs) -> Result<()> {
    let session = Session::open(globals, &args.remote)?;
    let options = Options {
        scope: args.scope.into(),
        ..Options::default()
    };
    let report = session.run(Workflow::Normalize, &options, args.dryrun)?;
    print_report(globals, Workflow::Normalize, args.dryrun, &report);
    Ok(())
}
