//! Cheap identity checks
//!
//! Decide whether a local catalog and its remote counterpart are "the same"
//! without downloading anything: creation date, revision date and one count
//! are compared. A mismatch is what triggers the more expensive merge or
//! diff.

use std::fmt;

use crate::catalog::Catalog;
use crate::remote::{RemoteStats, ResourceStats};
use crate::timestamp::{format_timestamp, Timestamp};

/// A compared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Creation,
    Revision,
    StringCount,
    TranslatedCount,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityField::Creation => "creation",
            IdentityField::Revision => "revision",
            IdentityField::StringCount => "string count",
            IdentityField::TranslatedCount => "translated entries",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDifference {
    pub field: IdentityField,
    pub local: String,
    pub remote: String,
}

/// Result of an identity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Identical,
    Differs(Vec<FieldDifference>),
}

impl Identity {
    pub fn is_identical(&self) -> bool {
        matches!(self, Identity::Identical)
    }

    fn from_differences(differences: Vec<FieldDifference>) -> Self {
        if differences.is_empty() {
            Identity::Identical
        } else {
            Identity::Differs(differences)
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Identical => f.write_str("identical"),
            Identity::Differs(differences) => {
                f.write_str("differ:")?;
                for difference in differences {
                    let local = format!("PO File {}", difference.field);
                    let remote = format!("Remote {}", difference.field);
                    let pad = local.len().max(remote.len());
                    write!(
                        f,
                        "\n    {:>pad$}: {}\n    {:>pad$}: {}",
                        local, difference.local, remote, difference.remote
                    )?;
                }
                Ok(())
            }
        }
    }
}

fn show(timestamp: Option<Timestamp>) -> String {
    timestamp
        .as_ref()
        .map(format_timestamp)
        .unwrap_or_else(|| "None".to_string())
}

fn compare_dates(
    differences: &mut Vec<FieldDifference>,
    field: IdentityField,
    local: Option<Timestamp>,
    remote: Option<Timestamp>,
) {
    if local != remote {
        differences.push(FieldDifference {
            field,
            local: show(local),
            remote: show(remote),
        });
    }
}

fn compare_counts(
    differences: &mut Vec<FieldDifference>,
    field: IdentityField,
    local: usize,
    remote: usize,
) {
    if local != remote {
        differences.push(FieldDifference {
            field,
            local: local.to_string(),
            remote: remote.to_string(),
        });
    }
}

/// Compare a source catalog with the remote resource.
pub fn resources_identical(local: &Catalog, remote: &ResourceStats) -> Identity {
    let mut differences = Vec::new();
    compare_dates(
        &mut differences,
        IdentityField::Creation,
        local.metadata.creation_date(),
        remote.created_at,
    );
    compare_dates(
        &mut differences,
        IdentityField::Revision,
        local.metadata.revision_date(),
        remote.revised_at,
    );
    compare_counts(
        &mut differences,
        IdentityField::StringCount,
        local.string_count(),
        remote.string_count,
    );
    Identity::from_differences(differences)
}

/// Compare a translated catalog with the remote translation.
pub fn translations_identical(local: &Catalog, remote: &RemoteStats) -> Identity {
    let mut differences = Vec::new();
    compare_dates(
        &mut differences,
        IdentityField::Creation,
        local.metadata.creation_date(),
        remote.created_at,
    );
    compare_dates(
        &mut differences,
        IdentityField::Revision,
        local.metadata.revision_date(),
        remote.revised_at,
    );
    compare_counts(
        &mut differences,
        IdentityField::TranslatedCount,
        local.translated_count(),
        remote.translated_count,
    );
    Identity::from_differences(differences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{HeaderField, MessageEntry};
    use crate::timestamp::parse_timestamp;

    fn local() -> Catalog {
        let mut catalog = Catalog::with_entries(
            "de.po",
            vec![MessageEntry::new("a", "x"), MessageEntry::new("b", "")],
        )
        .unwrap();
        catalog
            .metadata
            .set(HeaderField::PotCreationDate, "2020-06-29 12:54+0000");
        catalog
            .metadata
            .set(HeaderField::PoRevisionDate, "2021-01-01 00:00:00+00:00");
        catalog
    }

    fn translation_stats(translated: usize) -> RemoteStats {
        RemoteStats {
            resource_slug: "by_4-0".to_string(),
            language: "de".to_string(),
            created_at: parse_timestamp("2020-06-29T12:54:00Z"),
            revised_at: parse_timestamp("2021-01-01T00:00:00Z"),
            translated_count: translated,
            untranslated_count: 1,
        }
    }

    #[test]
    fn test_translations_identical() {
        assert!(translations_identical(&local(), &translation_stats(1)).is_identical());
    }

    #[test]
    fn test_translations_differ_by_count() {
        let identity = translations_identical(&local(), &translation_stats(2));
        match identity {
            Identity::Differs(differences) => {
                assert_eq!(differences.len(), 1);
                assert_eq!(differences[0].field, IdentityField::TranslatedCount);
                assert_eq!(differences[0].local, "1");
                assert_eq!(differences[0].remote, "2");
            }
            Identity::Identical => panic!("expected a difference"),
        }
    }

    #[test]
    fn test_resources_differ_by_revision_and_count() {
        let stats = ResourceStats {
            slug: "by_4-0".to_string(),
            name: "CC BY 4.0".to_string(),
            created_at: parse_timestamp("2020-06-29T12:54:00Z"),
            revised_at: None,
            string_count: 3,
        };
        let identity = resources_identical(&local(), &stats);
        let rendered = identity.to_string();
        assert!(rendered.starts_with("differ:"));
        assert!(rendered.contains("PO File revision: 2021-01-01 00:00:00+00:00"));
        assert!(rendered.contains("Remote revision: None"));
        assert!(rendered.contains("Remote string count: 3"));
        assert!(!rendered.contains("creation"));
    }

    #[test]
    fn test_both_dates_absent_is_identical() {
        let catalog =
            Catalog::with_entries("de.po", vec![MessageEntry::new("a", "x")]).unwrap();
        let stats = RemoteStats {
            created_at: None,
            revised_at: None,
            ..translation_stats(1)
        };
        assert!(translations_identical(&catalog, &stats).is_identical());
    }
}
