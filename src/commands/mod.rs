//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `catalog-sync` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the global options and the parsed
//!   `Args` and performs the command's logic.
//!
//! The workflow commands share the argument groups and the wiring defined
//! here: load the configuration, build the file store, the HTTP client and
//! the git repository, run the workflow and print its report.

pub mod compare;
pub mod completions;
pub mod normalize;
pub mod pull;
pub mod push;
pub mod push_resource;
pub mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use catalog_sync::catalog::store::FileCatalogStore;
use catalog_sync::config::{self, Config};
use catalog_sync::error::Error;
use catalog_sync::output::{render_summary, OutputConfig};
use catalog_sync::remote::transifex::TransifexClient;
use catalog_sync::repository::GitRepository;
use catalog_sync::suggestions;
use catalog_sync::sync::discovery::Scope;
use catalog_sync::sync::orchestrator::{Options, Orchestrator};
use catalog_sync::sync::{RunReport, SyncRun, Workflow};

/// Options given before the subcommand.
#[derive(Debug)]
pub struct Globals {
    pub config: Option<PathBuf>,
    pub output: OutputConfig,
}

/// Which resources and languages a run covers.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Limit to a resource slug, gettext domain or resource group
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Limit to one language (tag, locale name or remote code)
    #[arg(short, long, value_name = "LANGUAGE")]
    pub language: Option<String>,
}

impl From<ScopeArgs> for Scope {
    fn from(args: ScopeArgs) -> Self {
        Scope {
            domain: args.domain,
            language: args.language,
        }
    }
}

/// Credentials for the translation service.
#[derive(Args, Debug, Clone, Default)]
pub struct RemoteArgs {
    /// API token for the translation service
    #[arg(long, value_name = "TOKEN", env = "TRANSIFEX_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

/// Locate and load the configuration.
pub fn load_config(globals: &Globals) -> Result<Config> {
    let path = config::locate(globals.config.as_deref()).map_err(suggestions::explain)?;
    log::debug!("Using configuration {}", path.display());
    config::load(&path).map_err(suggestions::explain)
}

/// Map a run failure to a hinted CLI error.
pub fn explain_run_error(config: &Config, error: Error) -> anyhow::Error {
    match error {
        Error::UnknownResource { slug } => {
            let known: Vec<&str> = config.resources.iter().map(|r| r.slug.as_str()).collect();
            suggestions::unknown_resource(&slug, &known)
        }
        other => suggestions::explain(other),
    }
}

/// Everything a workflow command needs besides its own flags.
pub struct Session {
    pub config: Config,
    store: FileCatalogStore,
    remote: TransifexClient,
    repository: GitRepository,
}

impl Session {
    /// Load the configuration and connect the collaborators.
    pub fn open(globals: &Globals, remote: &RemoteArgs) -> Result<Self> {
        let config = load_config(globals)?;
        let token = match remote.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(suggestions::missing_api_token()),
        };
        let client = TransifexClient::new(&config, token).map_err(suggestions::explain)?;
        let repository = GitRepository::new(config.data_dir.clone(), config.git.clone());
        Ok(Self {
            config,
            store: FileCatalogStore,
            remote: client,
            repository,
        })
    }

    fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(&self.config, &self.store, &self.remote, &self.repository)
    }

    /// Run one of the four workflows.
    pub fn run(&self, workflow: Workflow, options: &Options, dry_run: bool) -> Result<RunReport> {
        let mut run = SyncRun::new(dry_run);
        self.orchestrator()
            .run(workflow, options, &mut run)
            .map_err(|e| explain_run_error(&self.config, e))
    }

    /// Create or update a single resource.
    pub fn push_resource(&self, slug: &str, dry_run: bool) -> Result<RunReport> {
        let mut run = SyncRun::new(dry_run);
        self.orchestrator()
            .push_resource(slug, &mut run)
            .map_err(|e| explain_run_error(&self.config, e))
    }
}

/// Print diffs to stdout and the summary after them.
pub fn print_report(globals: &Globals, workflow: Workflow, dry_run: bool, report: &RunReport) {
    for diff in &report.diffs {
        println!("{}", diff);
    }
    if !report.diffs.is_empty() {
        println!();
    }
    println!("{}", render_summary(&globals.output, workflow, dry_run, report));
}
