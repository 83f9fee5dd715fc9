//! # Push-Resource Command Implementation
//!
//! Upload the source catalog of one configured resource, creating the
//! resource on the remote when it does not exist yet. The uploaded source
//! carries no translations.

use anyhow::Result;
use clap::Args;

use catalog_sync::sync::Workflow;

use super::{print_report, Globals, RemoteArgs, Session};

/// Upload (or create) a single resource's source catalog
#[derive(Args, Debug)]
pub struct PushResourceArgs {
    /// Slug of the configured resource
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// Log what would change without uploading anything
    #[arg(short = 'n', long)]
    pub dryrun: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Execute the `push-resource` command.
pub fn execute(globals: &Globals, args: PushResourceArgs) -> Result<()> {
    let session = Session::open(globals, &args.remote)?;
    let report = session.push_resource(&args.slug, args.dryrun)?;
    print_report(globals, Workflow::Push, args.dryrun, &report);
    Ok(())
}
