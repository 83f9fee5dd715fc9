//! # Push Command Implementation
//!
//! This module implements the `push` subcommand: upload local translations
//! for every resource and language in scope. A translation the remote
//! already has translated strings for is left alone unless `--force` is
//! given, which overwrites it. A normalize pass over the same scope follows.
//!
//! ## Confirmation
//!
//! `--force` replaces work on the remote, so it asks for confirmation first
//! unless `--yes` or `--dryrun` is given.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use catalog_sync::sync::orchestrator::Options;
use catalog_sync::sync::Workflow;

use super::{print_report, Globals, RemoteArgs, ScopeArgs, Session};

/// Upload local translations to the remote
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Log what would change without uploading anything
    #[arg(short = 'n', long)]
    pub dryrun: bool,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Overwrite translations the remote already has
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt for --force
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

fn confirm_force(args: &PushArgs) -> Result<bool> {
    if !args.force || args.yes || args.dryrun {
        return Ok(true);
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Overwrite remote translations with the local catalogs?")
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Execute the `push` command.
pub fn execute(globals: &Globals, args: PushArgs) -> Result<()> {
    if !confirm_force(&args)? {
        println!("Push cancelled.");
        return Ok(());
    }

    let session = Session::open(globals, &args.remote)?;
    let options = Options {
        scope: args.scope.into(),
        force: args.force,
        ..Options::default()
    };
    let report = session.run(Workflow::Push, &options, args.dryrun)?;
    print_report(globals, Workflow::Push, args.dryrun, &report);
    Ok(())
}
