//! Header normalization
//!
//! Four header fields are owned by this tool and rewritten to canonical
//! values: `Language`, `Language-Team`, `Last-Translator` (only removed when
//! it still holds the gettext placeholder) and `Project-Id-Version`. Every
//! other field is left as found.

use std::fmt;

use log::info;

use super::SyncRun;
use crate::catalog::{Catalog, HeaderField};
use crate::config::Config;
use crate::defaults::UNSET_TRANSLATOR;

/// Canonical values for one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMetadata {
    pub language: String,
    pub language_team: String,
    pub project_id_version: String,
}

impl CanonicalMetadata {
    /// Canonical values for the catalog of `slug` in `remote_code`.
    pub fn for_catalog(config: &Config, slug: &str, remote_code: &str, is_source: bool) -> Self {
        Self {
            language: remote_code.to_string(),
            language_team: config.language_team_url(remote_code, is_source),
            project_id_version: slug.to_string(),
        }
    }
}

/// One header field change. `new == None` means the field is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataChange {
    pub field: HeaderField,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl fmt::Display for MetadataChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.new) {
            (_, Some(new)) => write!(f, "'{}': New value: '{}'", self.field, new),
            (Some(old), None) => write!(f, "'{}': Removing: '{}'", self.field, old),
            (None, None) => write!(f, "'{}': unchanged", self.field),
        }
    }
}

/// Changes made (or, under dry-run, that would be made) to one catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub changes: Vec<MetadataChange>,
}

impl NormalizeReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether the catalog was modified and needs saving.
    pub fn modified(&self, run: &SyncRun) -> bool {
        !run.dry_run() && !self.is_empty()
    }
}

/// Bring the tool-owned header fields of `catalog` to their canonical values.
///
/// Under dry-run the catalog is left untouched and the report lists what
/// would change.
pub fn normalize_metadata(
    catalog: &mut Catalog,
    canonical: &CanonicalMetadata,
    run: &SyncRun,
    label: &str,
) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    let targets = [
        (HeaderField::Language, &canonical.language),
        (HeaderField::LanguageTeam, &canonical.language_team),
        (HeaderField::ProjectIdVersion, &canonical.project_id_version),
    ];
    for (field, value) in targets {
        let current = catalog.metadata.get(field);
        if current == Some(value.as_str()) {
            continue;
        }
        report.changes.push(MetadataChange {
            field,
            old: current.map(str::to_string),
            new: Some(value.clone()),
        });
    }

    if catalog.metadata.get(HeaderField::LastTranslator) == Some(UNSET_TRANSLATOR) {
        report.changes.push(MetadataChange {
            field: HeaderField::LastTranslator,
            old: Some(UNSET_TRANSLATOR.to_string()),
            new: None,
        });
    }

    // Report in header-field order regardless of how they were checked.
    report
        .changes
        .sort_by_key(|change| HeaderField::ALL.iter().position(|f| *f == change.field));

    for change in &report.changes {
        info!(
            "{}{}: Correcting PO file {}\n{}",
            run.nop(),
            label,
            change,
            catalog.location.display()
        );
        if run.dry_run() {
            continue;
        }
        match &change.new {
            Some(value) => catalog.metadata.set(change.field, value.clone()),
            None => {
                catalog.metadata.remove(change.field);
            }
        }
    }

    report
}
