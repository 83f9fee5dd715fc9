//! Date reconciliation
//!
//! The translation service does not let clients set resource or translation
//! dates, so dates only ever move from the remote into local catalogs:
//!
//! - `POT-Creation-Date`: the remote value wins whenever the two differ.
//! - `PO-Revision-Date`: adopted when the local value is missing or
//!   unparsable, or when both catalogs hold the same entries. When the
//!   entries differ the dates stay as they are and the conflict is logged,
//!   since adopting the remote date would claim an equality that is not
//!   there.

use log::{error, info};

use super::SyncRun;
use crate::catalog::{Catalog, HeaderField, MessageEntry};
use crate::error::Result;
use crate::remote::{RemoteStats, ResourceStats};
use crate::timestamp::{format_timestamp, Timestamp};

/// The remote side of a date comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDates {
    pub created_at: Option<Timestamp>,
    pub revised_at: Option<Timestamp>,
    /// Counts shown when revisions conflict, when the remote reports them.
    pub translated_count: Option<usize>,
    pub untranslated_count: Option<usize>,
}

impl From<&ResourceStats> for RemoteDates {
    fn from(stats: &ResourceStats) -> Self {
        Self {
            created_at: stats.created_at,
            revised_at: stats.revised_at,
            translated_count: None,
            untranslated_count: None,
        }
    }
}

impl From<&RemoteStats> for RemoteDates {
    fn from(stats: &RemoteStats) -> Self {
        Self {
            created_at: stats.created_at,
            revised_at: stats.revised_at,
            translated_count: Some(stats.translated_count),
            untranslated_count: Some(stats.untranslated_count),
        }
    }
}

/// What reconciliation did (or, under dry-run, would do).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateReport {
    pub creation_updated: bool,
    pub revision_updated: bool,
    /// Revisions differ and the content differs too.
    pub revision_conflict: bool,
}

impl DateReport {
    /// Whether the catalog was modified and needs saving.
    pub fn modified(&self, run: &SyncRun) -> bool {
        !run.dry_run() && (self.creation_updated || self.revision_updated)
    }
}

/// Live entries of both catalogs match position by position.
///
/// A length difference counts as a difference.
pub fn same_entries(local: &Catalog, remote: &Catalog) -> bool {
    let live = |catalog: &Catalog| -> Vec<MessageEntry> {
        catalog
            .entries()
            .iter()
            .filter(|entry| !entry.obsolete)
            .cloned()
            .collect()
    };
    let (local, remote) = (live(local), live(remote));
    local.len() == remote.len() && local.iter().zip(&remote).all(|(l, r)| l.same_content(r))
}

fn show(timestamp: Option<&Timestamp>) -> String {
    timestamp.map(format_timestamp).unwrap_or_else(|| "None".to_string())
}

fn show_count(count: Option<usize>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Align the local dates of `catalog` with `remote`.
///
/// `fetch_remote` is only called when both revision dates are present and
/// differ; it must return the remote catalog for a positional comparison.
pub fn reconcile_dates<F>(
    catalog: &mut Catalog,
    remote: &RemoteDates,
    fetch_remote: F,
    run: &SyncRun,
    label: &str,
) -> Result<DateReport>
where
    F: FnOnce() -> Result<Catalog>,
{
    let mut report = DateReport::default();
    let path = catalog.location.display().to_string();
    let pad = path.len();
    let remote_label = format!("Remote {}", label);

    if let Some(remote_created) = remote.created_at {
        let local_created = catalog.metadata.creation_date();
        if local_created != Some(remote_created) {
            info!(
                "{}{}: Correcting PO file 'POT-Creation-Date' to match remote:\n{}: {}\n{:>pad$}: {}",
                run.nop(),
                label,
                path,
                show(local_created.as_ref()),
                remote_label,
                show(Some(&remote_created)),
            );
            report.creation_updated = true;
            if !run.dry_run() {
                catalog
                    .metadata
                    .set(HeaderField::PotCreationDate, format_timestamp(&remote_created));
            }
        }
    }

    let Some(remote_revised) = remote.revised_at else {
        return Ok(report);
    };
    let local_revised = catalog.metadata.revision_date();
    let adopt = match local_revised {
        None => true,
        Some(local) if local == remote_revised => false,
        Some(_) => {
            let remote_catalog = fetch_remote()?;
            if same_entries(catalog, &remote_catalog) {
                true
            } else {
                error!(
                    "{}{}: 'PO-Revision-Date' mismatch:\n\
                     {:>pad$}: {}\n{:>pad$}: {}\n{:>pad$}: {}\n\
                     {}: {}\n{:>pad$}: {}\n{:>pad$}: {}",
                    run.nop(),
                    label,
                    remote_label,
                    show(Some(&remote_revised)),
                    "translated strings",
                    show_count(remote.translated_count),
                    "untranslated strings",
                    show_count(remote.untranslated_count),
                    path,
                    show(local_revised.as_ref()),
                    "translated strings",
                    catalog.translated_count(),
                    "untranslated strings",
                    catalog.untranslated_count(),
                );
                report.revision_conflict = true;
                false
            }
        }
    };

    if adopt {
        info!(
            "{}{}: Correcting PO file 'PO-Revision-Date' to match remote:\n{:>pad$}: {}\n{}: {}",
            run.nop(),
            label,
            remote_label,
            show(Some(&remote_revised)),
            path,
            show(local_revised.as_ref()),
        );
        report.revision_updated = true;
        if !run.dry_run() {
            catalog
                .metadata
                .set(HeaderField::PoRevisionDate, format_timestamp(&remote_revised));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MessageEntry;
    use crate::error::Error;
    use crate::timestamp::parse_timestamp;

    fn ts(value: &str) -> Timestamp {
        parse_timestamp(value).unwrap()
    }

    fn catalog(created: Option<&str>, revised: Option<&str>, translation: &str) -> Catalog {
        let mut catalog = Catalog::with_entries(
            "locale/de/LC_MESSAGES/django.po",
            vec![MessageEntry::new("a", translation), MessageEntry::new("b", "")],
        )
        .unwrap();
        if let Some(created) = created {
            catalog.metadata.set(HeaderField::PotCreationDate, created);
        }
        if let Some(revised) = revised {
            catalog.metadata.set(HeaderField::PoRevisionDate, revised);
        }
        catalog
    }

    fn remote(created: &str, revised: &str) -> RemoteDates {
        RemoteDates {
            created_at: Some(ts(created)),
            revised_at: Some(ts(revised)),
            translated_count: Some(1),
            untranslated_count: Some(1),
        }
    }

    fn never() -> Result<Catalog> {
        Err(Error::config("remote catalog should not be fetched"))
    }

    #[test]
    fn test_creation_date_follows_remote() {
        let mut local = catalog(Some("2020-01-01 00:00+0000"), Some("2021-01-01 00:00+0000"), "x");
        let run = SyncRun::new(false);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-01-01T00:00:00Z"),
            never,
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert!(report.creation_updated);
        assert!(!report.revision_updated);
        assert_eq!(local.metadata.creation_date(), Some(ts("2019-06-01T00:00:00Z")));
    }

    #[test]
    fn test_missing_revision_adopts_remote() {
        let mut local = catalog(None, Some("YEAR-MO-DA HO:MI+ZONE"), "x");
        let run = SyncRun::new(false);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-03-04T05:06:07Z"),
            never,
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert!(report.revision_updated);
        assert_eq!(
            local.metadata.get(HeaderField::PoRevisionDate),
            Some("2021-03-04 05:06:07+00:00")
        );
    }

    #[test]
    fn test_same_content_adopts_remote_revision() {
        let mut local = catalog(None, Some("2020-01-01 00:00+0000"), "x");
        let remote_catalog = catalog(None, None, "x");
        let run = SyncRun::new(false);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-03-04T05:06:07Z"),
            || Ok(remote_catalog),
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert!(report.revision_updated);
        assert!(!report.revision_conflict);
        assert_eq!(local.metadata.revision_date(), Some(ts("2021-03-04T05:06:07Z")));
    }

    #[test]
    fn test_different_content_keeps_local_revision() {
        let mut local = catalog(None, Some("2020-01-01 00:00+0000"), "x");
        let remote_catalog = catalog(None, None, "y");
        let run = SyncRun::new(false);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-03-04T05:06:07Z"),
            || Ok(remote_catalog),
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert!(report.revision_conflict);
        assert!(!report.revision_updated);
        assert_eq!(local.metadata.revision_date(), Some(ts("2020-01-01T00:00:00Z")));
    }

    #[test]
    fn test_equal_instants_are_left_alone() {
        let mut local = catalog(
            Some("2019-06-01 02:00+0200"),
            Some("2021-03-04 05:06:07+00:00"),
            "x",
        );
        let run = SyncRun::new(false);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-03-04T05:06:07Z"),
            never,
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert_eq!(report, DateReport::default());
    }

    #[test]
    fn test_missing_remote_dates_change_nothing() {
        let mut local = catalog(None, None, "x");
        let run = SyncRun::new(false);
        let report =
            reconcile_dates(&mut local, &RemoteDates::default(), never, &run, "by_4-0 de").unwrap();
        assert_eq!(report, DateReport::default());
        assert!(local.metadata.is_empty());
    }

    #[test]
    fn test_dry_run_reports_without_mutating() {
        let mut local = catalog(None, None, "x");
        let run = SyncRun::new(true);
        let report = reconcile_dates(
            &mut local,
            &remote("2019-06-01T00:00:00Z", "2021-03-04T05:06:07Z"),
            never,
            &run,
            "by_4-0 de",
        )
        .unwrap();
        assert!(report.creation_updated && report.revision_updated);
        assert!(!report.modified(&run));
        assert!(local.metadata.is_empty());
    }

    #[test]
    fn test_same_entries_length_difference() {
        let short = Catalog::with_entries("a.po", vec![MessageEntry::new("a", "x")]).unwrap();
        let long = catalog(None, None, "x");
        assert!(!same_entries(&long, &short));
        assert!(!same_entries(&short, &long));
    }

    #[test]
    fn test_same_entries_ignores_obsolete() {
        let mut local = catalog(None, None, "x");
        let mut obsolete = MessageEntry::new("gone", "weg");
        obsolete.obsolete = true;
        local.push(obsolete).unwrap();
        assert!(same_entries(&local, &catalog(None, None, "x")));
    }
}
