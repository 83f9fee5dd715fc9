//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use catalog_sync::output::OutputConfig;

use crate::commands::{self, Globals};

/// Catalog Sync - Keep gettext catalogs in step with a translation service
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the .catalog-sync.yaml configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "CATALOG_SYNC_CONFIG"
    )]
    config: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill local gaps from the remote and normalize headers and dates
    Normalize(commands::normalize::NormalizeArgs),

    /// Show where local catalogs and the remote differ
    Compare(commands::compare::CompareArgs),

    /// Overwrite local translations with the remote ones
    Pull(commands::pull::PullArgs),

    /// Upload local translations to the remote
    Push(commands::push::PushArgs),

    /// Upload (or create) a single resource's source catalog
    PushResource(commands::push_resource::PushResourceArgs),

    /// Show local translation statistics
    Stats(commands::stats::StatsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(Env::default().default_filter_or(&self.log_level))
            .format_target(false)
            .init();

        let globals = Globals {
            config: self.config,
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Normalize(args) => commands::normalize::execute(&globals, args),
            Commands::Compare(args) => commands::compare::execute(&globals, args),
            Commands::Pull(args) => commands::pull::execute(&globals, args),
            Commands::Push(args) => commands::push::execute(&globals, args),
            Commands::PushResource(args) => commands::push_resource::execute(&globals, args),
            Commands::Stats(args) => commands::stats::execute(&globals, args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
