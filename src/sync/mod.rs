//! # Synchronization Engine
//!
//! Everything that keeps local catalogs and the translation service
//! consistent. The building blocks are plain functions over a
//! [`Catalog`](crate::catalog::Catalog) and remote statistics; the
//! [`orchestrator`] wires them into the four workflows.
//!
//! ## Components
//!
//! - [`normalize`]: rewrite the header fields this tool owns.
//! - [`dates`]: bring local creation/revision dates in line with the remote.
//! - [`identity`]: cheap "same or not" checks using counts and dates only.
//! - [`merge`]: fill empty local translations from the remote, position by
//!   position.
//! - [`diff`]: unified diffs for `compare`.
//! - [`discovery`]: which resources and languages a run covers.
//! - [`stats`]: local translation statistics.
//!
//! ## Run context
//!
//! A [`SyncRun`] is created per invocation and passed by reference into every
//! step. It carries the dry-run flag and caches remote statistics until a
//! mutating call invalidates them.

pub mod dates;
pub mod diff;
pub mod discovery;
pub mod identity;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod stats;

use std::fmt;

use log::{debug, error};

use crate::cache::{KeyedCache, RunCache};
use crate::error::{Error, Result};
use crate::remote::{RemoteClient, RemoteStats, ResourceStats, ResourceStatsMap, TranslationStatsMap};

/// Prefix of every log line describing an action skipped by dry-run.
pub const NOP_PREFIX: &str = "<NOP> ";

/// The workflows the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Normalize,
    Compare,
    Pull,
    Push,
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workflow::Normalize => "normalize",
            Workflow::Compare => "compare",
            Workflow::Pull => "pull",
            Workflow::Push => "push",
        };
        f.write_str(name)
    }
}

/// Per-invocation state: the dry-run flag and cached remote statistics.
#[derive(Debug, Default)]
pub struct SyncRun {
    dry_run: bool,
    resource_stats: RunCache<ResourceStatsMap>,
    translation_stats: RunCache<TranslationStatsMap>,
    resource_exists: KeyedCache<String, bool>,
}

impl SyncRun {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Log prefix: [`NOP_PREFIX`] under dry-run, empty otherwise.
    pub fn nop(&self) -> &'static str {
        if self.dry_run {
            NOP_PREFIX
        } else {
            ""
        }
    }

    /// Stats of every remote resource, fetched once per run.
    pub fn resource_stats(&mut self, remote: &dyn RemoteClient) -> Result<&ResourceStatsMap> {
        self.resource_stats.get_or_fetch(|| {
            debug!("Fetching resource stats");
            remote.get_resource_stats()
        })
    }

    /// Stats of every remote translation, fetched once per run.
    pub fn translation_stats(&mut self, remote: &dyn RemoteClient) -> Result<&TranslationStatsMap> {
        self.translation_stats.get_or_fetch(|| {
            debug!("Fetching translation stats");
            remote.get_translation_stats()
        })
    }

    /// Stats of one resource, if the remote has it.
    pub fn resource(&mut self, remote: &dyn RemoteClient, slug: &str) -> Result<Option<ResourceStats>> {
        Ok(self.resource_stats(remote)?.get(slug).cloned())
    }

    /// Stats of one translation, if the remote has it.
    pub fn translation(
        &mut self,
        remote: &dyn RemoteClient,
        slug: &str,
        language: &str,
    ) -> Result<Option<RemoteStats>> {
        Ok(self
            .translation_stats(remote)?
            .get(slug)
            .and_then(|languages| languages.get(language))
            .cloned())
    }

    /// Whether the remote has a resource, cached per slug.
    pub fn resource_exists(&mut self, remote: &dyn RemoteClient, slug: &str) -> Result<bool> {
        let stats = &mut self.resource_stats;
        self.resource_exists.get_or_compute(slug.to_string(), || {
            let known = stats.get_or_fetch(|| {
                debug!("Fetching resource stats");
                remote.get_resource_stats()
            })?;
            Ok(known.contains_key(slug))
        })
    }

    /// Forget everything fetched so far. Called after every remote mutation.
    pub fn invalidate(&mut self) {
        debug!("Invalidating cached remote stats");
        self.resource_stats.invalidate();
        self.translation_stats.invalidate();
        self.resource_exists.clear();
    }

    /// Total number of stats fetches made by this run.
    pub fn fetches(&self) -> usize {
        self.resource_stats.fetches() + self.translation_stats.fetches()
    }
}

/// Why an item was skipped. Skips are reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The remote has no translation in this language for the resource.
    UnsupportedLanguage { resource: String, language: String },
    /// The remote has no such resource.
    MissingResource { resource: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedLanguage { resource, language } => write!(
                f,
                "{} {}: Language not supported by the remote resource",
                resource, language
            ),
            SkipReason::MissingResource { resource } => {
                write!(f, "{}: Resource does not exist on the remote", resource)
            }
        }
    }
}

/// Outcome of processing one (resource, language) item.
#[derive(Debug)]
pub enum ItemResult {
    Ok,
    Skipped(SkipReason),
    Fatal(Error),
}

impl From<Result<Option<SkipReason>>> for ItemResult {
    fn from(result: Result<Option<SkipReason>>) -> Self {
        match result {
            Ok(None) => ItemResult::Ok,
            Ok(Some(reason)) => ItemResult::Skipped(reason),
            Err(e) => ItemResult::Fatal(e),
        }
    }
}

/// Totals of one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Items handled without a skip.
    pub processed: usize,
    pub skipped: Vec<SkipReason>,
    /// Local files written (catalogs and compiled catalogs).
    pub files_written: usize,
    /// Uploads and resource creations.
    pub remote_mutations: usize,
    pub structural_mismatches: usize,
    /// Header fields changed, or that would change under dry-run.
    pub metadata_changes: usize,
    /// Entries filled from the remote by safe merge.
    pub filled: usize,
    pub identity_mismatches: usize,
    pub date_conflicts: usize,
    /// Rendered diffs produced by `compare`.
    pub diffs: Vec<String>,
}

impl RunReport {
    /// Fold an item result into the report.
    ///
    /// Skips are logged and counted, a fatal result is returned as the error
    /// that aborts the run.
    pub fn record(&mut self, item: ItemResult) -> Result<()> {
        match item {
            ItemResult::Ok => {
                self.processed += 1;
                Ok(())
            }
            ItemResult::Skipped(reason) => {
                error!("{}", reason);
                self.skipped.push(reason);
                Ok(())
            }
            ItemResult::Fatal(e) => Err(e),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed: {}", self.processed)?;
        writeln!(f, "Skipped: {}", self.skipped.len())?;
        writeln!(f, "Files written: {}", self.files_written)?;
        writeln!(f, "Remote changes: {}", self.remote_mutations)?;
        writeln!(f, "Metadata changes: {}", self.metadata_changes)?;
        writeln!(f, "Translations filled: {}", self.filled)?;
        writeln!(f, "Identity mismatches: {}", self.identity_mismatches)?;
        writeln!(f, "Structural mismatches: {}", self.structural_mismatches)?;
        write!(f, "Date conflicts: {}", self.date_conflicts)
    }
}
