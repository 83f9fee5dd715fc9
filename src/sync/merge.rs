//! Safe merge
//!
//! Fill gaps in a local catalog from the remote without ever overwriting
//! local work. Catalogs are aligned position by position; the ids at each
//! position must agree before anything is copied, and only entries whose
//! local translation is empty receive the remote one.

use log::{error, info};

use super::SyncRun;
use crate::catalog::Catalog;

/// Entries at the same position carry different ids, or the remote catalog
/// ends before the local one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralMismatch {
    pub index: usize,
    pub local_id: String,
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Position and id of every filled entry.
    pub filled: Vec<(usize, String)>,
    pub structural_mismatches: Vec<StructuralMismatch>,
}

impl MergeReport {
    /// Whether the catalog was modified and needs saving.
    pub fn modified(&self, run: &SyncRun) -> bool {
        !run.dry_run() && !self.filled.is_empty()
    }
}

fn abbreviate(id: &str) -> String {
    if id.chars().count() > 60 {
        let head: String = id.chars().take(62).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Copy remote translations into empty local entries.
///
/// Local entries that are obsolete, already translated, or identical to the
/// remote are left alone. A differing id is recorded as a structural
/// mismatch and the position is skipped; ids are never realigned.
pub fn safe_merge(local: &mut Catalog, remote: &Catalog, run: &SyncRun, label: &str) -> MergeReport {
    let mut report = MergeReport::default();

    for index in 0..local.len() {
        let Some(local_entry) = local.get(index) else {
            break;
        };
        if local_entry.obsolete {
            continue;
        }
        let Some(remote_entry) = remote.get(index) else {
            error!(
                "{}{} Local PO File has more entries than the remote:\n    PO File: '{}'",
                run.nop(),
                label,
                abbreviate(&local_entry.id)
            );
            report.structural_mismatches.push(StructuralMismatch {
                index,
                local_id: local_entry.id.clone(),
                remote_id: None,
            });
            continue;
        };
        if local_entry.same_content(remote_entry) {
            continue;
        }
        if local_entry.id != remote_entry.id || local_entry.context != remote_entry.context {
            error!(
                "{}{} Local PO File msgid and remote msgid do not match:\n    PO File: '{}'\n     Remote: '{}'",
                run.nop(),
                label,
                abbreviate(&local_entry.id),
                abbreviate(&remote_entry.id)
            );
            report.structural_mismatches.push(StructuralMismatch {
                index,
                local_id: local_entry.id.clone(),
                remote_id: Some(remote_entry.id.clone()),
            });
            continue;
        }
        let local_has_any = !local_entry.translation.is_empty()
            || local_entry.plural_translations.iter().any(|t| !t.is_empty());
        let remote_has_any = !remote_entry.translation.is_empty()
            || remote_entry.plural_translations.iter().any(|t| !t.is_empty());
        if local_has_any || !remote_has_any {
            continue;
        }

        report.filled.push((index, local_entry.id.clone()));
        if !run.dry_run() {
            local.fill_translation(index, remote_entry);
        }
    }

    if !report.filled.is_empty() {
        let changes: Vec<String> = report
            .filled
            .iter()
            .map(|(index, id)| format!("msgid {:>4}: '{}'", index, abbreviate(id)))
            .collect();
        info!(
            "{}{} Adding translation from remote to PO File:\n  {}",
            run.nop(),
            label,
            changes.join("\n  ")
        );
    }

    report
}
