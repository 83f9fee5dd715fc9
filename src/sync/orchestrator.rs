//! # Workflow Orchestration
//!
//! Runs the normalize, compare, pull and push workflows (plus push-resource)
//! over the resources and languages in scope. Every workflow:
//!
//! 1. refuses to start when the working copy is dirty,
//! 2. discovers local catalogs in a fixed order,
//! 3. handles each (resource, language) item, turning "cannot process this
//!    one" conditions into [`SkipReason`]s and real failures into an error
//!    that aborts the run,
//! 4. returns a [`RunReport`].
//!
//! Pull and push finish with a normalize pass over the same scope so local
//! headers and dates reflect what the remote now holds.

use log::{debug, error, info, warn};

use super::dates::{reconcile_dates, RemoteDates};
use super::diff::{diff_entry, render, unified_diff};
use super::discovery::{discover, LocalCatalog, LocalResource, Scope};
use super::identity::{resources_identical, translations_identical};
use super::merge::safe_merge;
use super::normalize::{normalize_metadata, CanonicalMetadata};
use super::{ItemResult, RunReport, SkipReason, SyncRun, Workflow};
use crate::catalog::store::CatalogStore;
use crate::catalog::{po, Catalog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::remote::{RemoteClient, UploadSummary};
use crate::repository::Repository;

/// Options shared by the workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub scope: Scope,
    /// compare: diff even when identical. push: overwrite remote translations.
    pub force: bool,
    /// compare: color the diffs.
    pub colordiff: bool,
    /// pull: branch to pull onto, commit and push.
    pub branch: Option<String>,
}

/// Drives the workflows against a catalog store, a remote and a repository.
pub struct Orchestrator<'a> {
    config: &'a Config,
    store: &'a dyn CatalogStore,
    remote: &'a dyn RemoteClient,
    repository: &'a dyn Repository,
}

type ItemOutcome = Result<Option<SkipReason>>;

fn missing_resource(resource: &LocalResource) -> SkipReason {
    SkipReason::MissingResource {
        resource: resource.slug.clone(),
    }
}

fn unsupported_language(resource: &LocalResource, catalog: &LocalCatalog) -> SkipReason {
    SkipReason::UnsupportedLanguage {
        resource: resource.slug.clone(),
        language: catalog.remote_code.clone(),
    }
}

fn source_of(catalog: &Catalog) -> Vec<u8> {
    let mut source = catalog.clone();
    source.strip_translations();
    po::serialize(&source).into_bytes()
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        store: &'a dyn CatalogStore,
        remote: &'a dyn RemoteClient,
        repository: &'a dyn Repository,
    ) -> Self {
        Self {
            config,
            store,
            remote,
            repository,
        }
    }

    /// Run one workflow.
    pub fn run(&self, workflow: Workflow, options: &Options, run: &mut SyncRun) -> Result<RunReport> {
        info!("{}Running {}", run.nop(), workflow);
        match workflow {
            Workflow::Normalize => self.normalize(options, run),
            Workflow::Compare => self.compare(options, run),
            Workflow::Pull => self.pull(options, run),
            Workflow::Push => self.push(options, run),
        }
    }

    fn ensure_clean(&self, run: &SyncRun) -> Result<()> {
        if self.repository.is_dirty()? {
            warn!("{}Repository is dirty.", run.nop());
            return Err(Error::DirtyWorkingCopy {
                path: self.config.data_dir.clone(),
            });
        }
        Ok(())
    }

    fn persist(&self, catalog: &Catalog, modified: bool, report: &mut RunReport) -> Result<()> {
        if modified {
            self.store.save(catalog)?;
            report.files_written += 1;
        }
        Ok(())
    }

    fn download_source(&self, resource: &LocalResource) -> Result<Catalog> {
        let bytes = self.remote.download_source(&resource.slug)?;
        po::parse_bytes(&bytes, &resource.source.location)
    }

    fn download_translation(&self, resource: &LocalResource, catalog: &LocalCatalog) -> Result<Catalog> {
        let bytes = self
            .remote
            .download_translation(&resource.slug, &catalog.remote_code)?;
        po::parse_bytes(&bytes, &catalog.location)
    }

    fn log_resource_upload(&self, summary: &UploadSummary) {
        info!("Resource upload results: {}", summary);
        if summary.created == 0 && summary.updated == 0 {
            error!("Resource upload failed");
        } else if summary.skipped > 0 {
            warn!("Resource strings skipped");
        }
    }

    fn log_translation_upload(&self, summary: &UploadSummary) {
        info!("Translation upload results: {}", summary);
        if !summary.changed() {
            error!("Translation upload failed");
        }
    }

    fn create_resource(
        &self,
        resource: &LocalResource,
        catalog: &Catalog,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> Result<()> {
        warn!(
            "{}{}: Uploading resource to remote using: {}",
            run.nop(),
            resource.label(&resource.source),
            catalog.location.display()
        );
        if run.dry_run() {
            return Ok(());
        }
        let summary = self
            .remote
            .create_resource(&resource.slug, &resource.name, &source_of(catalog))?;
        report.remote_mutations += 1;
        self.log_resource_upload(&summary);
        run.invalidate();
        Ok(())
    }

    fn upload_translation(
        &self,
        label: &str,
        resource: &LocalResource,
        target: &LocalCatalog,
        catalog: &Catalog,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> Result<()> {
        info!(
            "{}{}: Uploading translation to remote using: {}",
            run.nop(),
            label,
            catalog.location.display()
        );
        if run.dry_run() {
            return Ok(());
        }
        let summary = self.remote.upload_translation(
            &resource.slug,
            &target.remote_code,
            po::serialize(catalog).as_bytes(),
        )?;
        report.remote_mutations += 1;
        self.log_translation_upload(&summary);
        run.invalidate();
        Ok(())
    }

    // normalize

    /// Normalize every catalog in scope against the remote.
    pub fn normalize(&self, options: &Options, run: &mut SyncRun) -> Result<RunReport> {
        self.ensure_clean(run)?;
        let resources = discover(self.config, self.store, &options.scope)?;
        let mut report = RunReport::default();
        self.normalize_pass(&resources, run, &mut report)?;
        Ok(report)
    }

    fn normalize_pass(
        &self,
        resources: &[LocalResource],
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> Result<()> {
        for resource in resources {
            let outcome = self.normalize_source(resource, run, report);
            let missing = matches!(outcome, Ok(Some(_)));
            report.record(ItemResult::from(outcome))?;
            if missing {
                continue;
            }
            for translation in &resource.translations {
                let outcome = self.normalize_translation(resource, translation, run, report);
                report.record(ItemResult::from(outcome))?;
            }
        }
        Ok(())
    }

    fn normalize_source(
        &self,
        resource: &LocalResource,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(&resource.source);
        let mut catalog = self.store.load(&resource.source.location)?;

        let canonical = CanonicalMetadata::for_catalog(
            self.config,
            &resource.slug,
            &resource.source.remote_code,
            true,
        );
        let normalized = normalize_metadata(&mut catalog, &canonical, run, &label);
        report.metadata_changes += normalized.len();
        let mut modified = normalized.modified(run);

        if !run.resource_exists(self.remote, &resource.slug)? {
            self.create_resource(resource, &catalog, run, report)?;
        } else {
            debug!("{}{}: Remote already contains resource.", run.nop(), label);
        }

        let Some(stats) = run.resource(self.remote, &resource.slug)? else {
            self.persist(&catalog, modified, report)?;
            return Ok(Some(missing_resource(resource)));
        };

        let dates = reconcile_dates(
            &mut catalog,
            &RemoteDates::from(&stats),
            || self.download_source(resource),
            run,
            &label,
        )?;
        if dates.revision_conflict {
            report.date_conflicts += 1;
        }
        modified |= dates.modified(run);

        self.persist(&catalog, modified, report)?;
        Ok(None)
    }

    fn normalize_translation(
        &self,
        resource: &LocalResource,
        target: &LocalCatalog,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(target);
        let mut catalog = self.store.load(&target.location)?;

        let canonical =
            CanonicalMetadata::for_catalog(self.config, &resource.slug, &target.remote_code, false);
        let normalized = normalize_metadata(&mut catalog, &canonical, run, &label);
        report.metadata_changes += normalized.len();
        let mut modified = normalized.modified(run);

        let Some(mut stats) = run.translation(self.remote, &resource.slug, &target.remote_code)?
        else {
            self.persist(&catalog, modified, report)?;
            return Ok(Some(unsupported_language(resource, target)));
        };

        if stats.translated_count == 0 && catalog.translated_count() > 0 {
            self.upload_translation(&label, resource, target, &catalog, run, report)?;
            if let Some(refreshed) =
                run.translation(self.remote, &resource.slug, &target.remote_code)?
            {
                stats = refreshed;
            }
        } else {
            debug!("{}{}: Remote already contains translation.", run.nop(), label);
        }

        let mut downloaded = None;
        let identity = translations_identical(&catalog, &stats);
        if !identity.is_identical() {
            report.identity_mismatches += 1;
            info!("{}{}: Translations {}", run.nop(), label, identity);
            let remote_catalog = self.download_translation(resource, target)?;
            let merged = safe_merge(&mut catalog, &remote_catalog, run, &label);
            report.filled += merged.filled.len();
            report.structural_mismatches += merged.structural_mismatches.len();
            modified |= merged.modified(run);
            downloaded = Some(remote_catalog);
        }

        let dates = reconcile_dates(
            &mut catalog,
            &RemoteDates::from(&stats),
            || match downloaded.take() {
                Some(remote_catalog) => Ok(remote_catalog),
                None => self.download_translation(resource, target),
            },
            run,
            &label,
        )?;
        if dates.revision_conflict {
            report.date_conflicts += 1;
        }
        modified |= dates.modified(run);

        self.persist(&catalog, modified, report)?;
        Ok(None)
    }

    // compare

    /// Report differences between local catalogs and the remote. Read only.
    pub fn compare(&self, options: &Options, run: &mut SyncRun) -> Result<RunReport> {
        self.ensure_clean(run)?;
        let resources = discover(self.config, self.store, &options.scope)?;
        let mut report = RunReport::default();
        for resource in &resources {
            let outcome = self.compare_source(resource, options, run, &mut report);
            let missing = matches!(outcome, Ok(Some(_)));
            report.record(ItemResult::from(outcome))?;
            if missing {
                continue;
            }
            for translation in &resource.translations {
                let outcome = self.compare_translation(resource, translation, options, run, &mut report);
                report.record(ItemResult::from(outcome))?;
            }
        }
        Ok(report)
    }

    fn push_diff(&self, lines: Vec<String>, options: &Options, report: &mut RunReport) {
        if !lines.is_empty() {
            report.diffs.push(render(&lines, options.colordiff));
        }
    }

    fn compare_source(
        &self,
        resource: &LocalResource,
        options: &Options,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(&resource.source);
        let catalog = self.store.load(&resource.source.location)?;
        let Some(stats) = run.resource(self.remote, &resource.slug)? else {
            return Ok(Some(missing_resource(resource)));
        };

        let identity = resources_identical(&catalog, &stats);
        if !identity.is_identical() {
            report.identity_mismatches += 1;
            warn!("{}: Resources {}", label, identity);
        }
        if options.force || !identity.is_identical() {
            let remote_catalog = self.download_source(resource)?;
            let ids = |catalog: &Catalog| -> String {
                catalog
                    .entries()
                    .iter()
                    .filter(|entry| !entry.obsolete)
                    .map(|entry| entry.id.replace('\n', "\\n"))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let lines = unified_diff(
                &ids(&catalog),
                &ids(&remote_catalog),
                &format!("{} PO File {}", resource.name, catalog.location.display()),
                &format!(
                    "{} Remote {} ({})",
                    resource.name, resource.slug, resource.source.remote_code
                ),
            );
            self.push_diff(lines, options, report);
        }
        Ok(None)
    }

    fn compare_translation(
        &self,
        resource: &LocalResource,
        target: &LocalCatalog,
        options: &Options,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(target);
        let catalog = self.store.load(&target.location)?;
        let Some(stats) = run.translation(self.remote, &resource.slug, &target.remote_code)? else {
            return Ok(Some(unsupported_language(resource, target)));
        };

        let identity = translations_identical(&catalog, &stats);
        if !identity.is_identical() {
            report.identity_mismatches += 1;
            warn!("{}: Translations {}", label, identity);
        }
        if !(options.force || !identity.is_identical()) {
            return Ok(None);
        }

        let remote_catalog = self.download_translation(resource, target)?;
        let from_label = format!("{} PO File {}", resource.name, catalog.location.display());
        let to_label = format!(
            "{} Remote {} {} ({})",
            resource.name, resource.slug, target.tag, target.remote_code
        );
        for (index, entry) in catalog.entries().iter().enumerate() {
            if entry.obsolete {
                continue;
            }
            let remote_entry = remote_catalog.get(index);
            if remote_entry.is_some_and(|remote_entry| entry.same_content(remote_entry)) {
                continue;
            }
            let lines = diff_entry(entry, remote_entry, &from_label, &to_label);
            self.push_diff(lines, options, report);
        }
        Ok(None)
    }

    // pull

    /// Overwrite local translations with the remote ones.
    pub fn pull(&self, options: &Options, run: &mut SyncRun) -> Result<RunReport> {
        self.ensure_clean(run)?;

        if let Some(branch) = &options.branch {
            info!("{}Preparing branch {}", run.nop(), branch);
            if !run.dry_run() {
                self.repository.fetch()?;
                self.repository.checkout_or_create_branch(branch)?;
            }
        }

        let resources = discover(self.config, self.store, &options.scope)?;
        let mut report = RunReport::default();
        for resource in &resources {
            if !run.resource_exists(self.remote, &resource.slug)? {
                report.record(ItemResult::Skipped(missing_resource(resource)))?;
                continue;
            }
            for translation in &resource.translations {
                let outcome = self.pull_translation(resource, translation, run, &mut report);
                report.record(ItemResult::from(outcome))?;
            }
        }

        if run.dry_run() {
            return Ok(report);
        }
        self.normalize_pass(&resources, run, &mut report)?;

        if let Some(branch) = &options.branch {
            if self.repository.has_changes()? {
                let message = format!(
                    "Update translations from {}/{}",
                    self.config.remote.organization, self.config.remote.project
                );
                self.repository.commit_and_push(&message)?;
            } else {
                info!("No translation changes to commit on {}", branch);
            }
        }
        Ok(report)
    }

    fn pull_translation(
        &self,
        resource: &LocalResource,
        target: &LocalCatalog,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(target);
        if run
            .translation(self.remote, &resource.slug, &target.remote_code)?
            .is_none()
        {
            return Ok(Some(unsupported_language(resource, target)));
        }

        let catalog = self.download_translation(resource, target)?;
        info!(
            "{}{}: overwriting local translation with remote translation: {}",
            run.nop(),
            label,
            catalog.location.display()
        );
        if !run.dry_run() {
            self.store.save(&catalog)?;
            self.store.save_compiled(&catalog)?;
            report.files_written += 2;
        }
        Ok(None)
    }

    // push

    /// Upload local translations.
    ///
    /// Remote translations that already have translated strings are only
    /// replaced with `force`.
    pub fn push(&self, options: &Options, run: &mut SyncRun) -> Result<RunReport> {
        self.ensure_clean(run)?;
        let resources = discover(self.config, self.store, &options.scope)?;
        let mut report = RunReport::default();
        for resource in &resources {
            if !run.resource_exists(self.remote, &resource.slug)? {
                report.record(ItemResult::Skipped(missing_resource(resource)))?;
                continue;
            }
            for translation in &resource.translations {
                let outcome = self.push_translation(resource, translation, options, run, &mut report);
                report.record(ItemResult::from(outcome))?;
            }
        }

        if !run.dry_run() {
            self.normalize_pass(&resources, run, &mut report)?;
        }
        Ok(report)
    }

    fn push_translation(
        &self,
        resource: &LocalResource,
        target: &LocalCatalog,
        options: &Options,
        run: &mut SyncRun,
        report: &mut RunReport,
    ) -> ItemOutcome {
        let label = resource.label(target);
        let catalog = self.store.load(&target.location)?;
        let Some(stats) = run.translation(self.remote, &resource.slug, &target.remote_code)? else {
            return Ok(Some(unsupported_language(resource, target)));
        };
        if stats.translated_count > 0 && !options.force {
            debug!("{}{}: Remote already contains translation.", run.nop(), label);
            return Ok(None);
        }
        self.upload_translation(&label, resource, target, &catalog, run, report)?;
        Ok(None)
    }

    // push-resource

    /// Upload the source catalog of one resource, creating it if needed.
    pub fn push_resource(&self, slug: &str, run: &mut SyncRun) -> Result<RunReport> {
        self.ensure_clean(run)?;
        self.config.resource(slug)?;
        let scope = Scope {
            domain: Some(slug.to_string()),
            language: None,
        };
        let resource = discover(self.config, self.store, &scope)?
            .into_iter()
            .find(|resource| resource.slug == slug)
            .ok_or_else(|| Error::UnknownResource {
                slug: slug.to_string(),
            })?;

        let mut report = RunReport::default();
        let catalog = self.store.load(&resource.source.location)?;
        if !run.resource_exists(self.remote, slug)? {
            self.create_resource(&resource, &catalog, run, &mut report)?;
            report.record(ItemResult::Ok)?;
            return Ok(report);
        }

        warn!(
            "{}{}: Uploading resource to remote using: {}",
            run.nop(),
            resource.label(&resource.source),
            catalog.location.display()
        );
        if !run.dry_run() {
            let summary = self.remote.upload_source(slug, &source_of(&catalog))?;
            report.remote_mutations += 1;
            self.log_resource_upload(&summary);
            run.invalidate();
        }
        report.record(ItemResult::Ok)?;
        Ok(report)
    }
}
