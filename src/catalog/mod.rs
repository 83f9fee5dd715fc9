//! # Catalog Model
//!
//! In-memory representation of one gettext message catalog: an ordered list
//! of [`MessageEntry`] values plus typed header [`Metadata`].
//!
//! ## Ordering
//!
//! Entries are addressed by id for lookups, but the sequence order is part of
//! the catalog. It is used to align local and remote catalogs position by
//! position, and catalogs are never re-sorted on save so that version-control
//! diffs stay minimal.
//!
//! ## Header keys
//!
//! Header fields are split into the [`HeaderField`] values this crate is
//! allowed to modify and a passthrough bucket for everything else. The
//! mutating methods on [`Metadata`] only accept a `HeaderField`, so code that
//! normalizes headers cannot touch `Content-Type`, `Plural-Forms` and friends.
//!
//! ## Submodules
//!
//! - [`po`]: PO text parsing and serialization.
//! - [`mo`]: compilation into the binary MO format.
//! - [`store`]: the [`store::CatalogStore`] trait and its implementations.

pub mod mo;
pub mod po;
pub mod store;

use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::timestamp::{parse_timestamp, Timestamp};

/// Header fields the sync engine reads or normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderField {
    Language,
    LanguageTeam,
    LastTranslator,
    ProjectIdVersion,
    PotCreationDate,
    PoRevisionDate,
}

impl HeaderField {
    /// Every known field, in the order normalization reports them.
    pub const ALL: [HeaderField; 6] = [
        HeaderField::Language,
        HeaderField::LanguageTeam,
        HeaderField::LastTranslator,
        HeaderField::ProjectIdVersion,
        HeaderField::PotCreationDate,
        HeaderField::PoRevisionDate,
    ];

    /// The header key as written in a PO file.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::Language => "Language",
            HeaderField::LanguageTeam => "Language-Team",
            HeaderField::LastTranslator => "Last-Translator",
            HeaderField::ProjectIdVersion => "Project-Id-Version",
            HeaderField::PotCreationDate => "POT-Creation-Date",
            HeaderField::PoRevisionDate => "PO-Revision-Date",
        }
    }

    /// Look up a known field by its PO header key.
    pub fn from_key(key: &str) -> Option<Self> {
        HeaderField::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header key: either a known field or an unrecognized passthrough key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderKey {
    Known(HeaderField),
    Passthrough(String),
}

impl HeaderKey {
    /// Classify a raw header key.
    pub fn parse(key: &str) -> Self {
        match HeaderField::from_key(key) {
            Some(field) => HeaderKey::Known(field),
            None => HeaderKey::Passthrough(key.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HeaderKey::Known(field) => field.as_str(),
            HeaderKey::Passthrough(key) => key,
        }
    }
}

/// Catalog header metadata, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: Vec<(HeaderKey, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a known field.
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.fields.iter().find_map(|(key, value)| match key {
            HeaderKey::Known(known) if *known == field => Some(value.as_str()),
            _ => None,
        })
    }

    /// Set a known field, replacing it in place or appending it at the end.
    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|(key, _)| *key == HeaderKey::Known(field))
        {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((HeaderKey::Known(field), value)),
        }
    }

    /// Remove a known field, returning its previous value.
    pub fn remove(&mut self, field: HeaderField) -> Option<String> {
        let position = self
            .fields
            .iter()
            .position(|(key, _)| *key == HeaderKey::Known(field))?;
        Some(self.fields.remove(position).1)
    }

    /// Get the value of a passthrough key.
    pub fn get_passthrough(&self, key: &str) -> Option<&str> {
        self.fields.iter().find_map(|(k, value)| match k {
            HeaderKey::Passthrough(name) if name == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Iterate over the passthrough bucket.
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(key, value)| match key {
            HeaderKey::Passthrough(name) => Some((name.as_str(), value.as_str())),
            HeaderKey::Known(_) => None,
        })
    }

    /// Append a raw `key: value` pair read from a file.
    ///
    /// Repeated keys keep the last value, as gettext tools do.
    pub(crate) fn insert_raw(&mut self, key: &str, value: &str) {
        let key = HeaderKey::parse(key);
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((key, value.to_string())),
        }
    }

    /// Iterate over all fields in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `POT-Creation-Date`, or `None` when absent or unparsable.
    pub fn creation_date(&self) -> Option<Timestamp> {
        self.get(HeaderField::PotCreationDate).and_then(parse_timestamp)
    }

    /// `PO-Revision-Date`, or `None` when absent or unparsable.
    pub fn revision_date(&self) -> Option<Timestamp> {
        self.get(HeaderField::PoRevisionDate).and_then(parse_timestamp)
    }
}

/// One message of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEntry {
    /// `msgctxt`, if any.
    pub context: Option<String>,
    /// `msgid`.
    pub id: String,
    /// `msgid_plural`, if this is a plural entry.
    pub plural_id: Option<String>,
    /// `msgstr`, or `msgstr[0]` for plural entries. Empty when untranslated.
    pub translation: String,
    /// `msgstr[1..]` for plural entries.
    pub plural_translations: Vec<String>,
    /// `#,` flags such as `fuzzy` or `python-format`, in file order.
    pub flags: Vec<String>,
    /// Every other comment line (`# `, `#.`, `#:`, `#|`), verbatim.
    pub comments: Vec<String>,
    /// `#~` obsolete entry.
    pub obsolete: bool,
}

impl MessageEntry {
    pub fn new(id: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Add a flag unless it is already present.
    pub fn add_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.has_flag(&flag) {
            self.flags.push(flag);
        }
    }

    pub fn is_fuzzy(&self) -> bool {
        self.has_flag("fuzzy")
    }

    /// Every translation string is non-empty. Ignores flags.
    pub fn has_translation(&self) -> bool {
        !self.translation.is_empty() && self.plural_translations.iter().all(|t| !t.is_empty())
    }

    /// Counted as translated: live, not fuzzy and fully translated.
    pub fn is_translated(&self) -> bool {
        !self.obsolete && !self.is_fuzzy() && self.has_translation()
    }

    /// Counted as untranslated: live, not fuzzy and not fully translated.
    pub fn is_untranslated(&self) -> bool {
        !self.obsolete && !self.is_fuzzy() && !self.has_translation()
    }

    /// Same message and same translations. Comments and flags are ignored.
    pub fn same_content(&self, other: &MessageEntry) -> bool {
        self.context == other.context
            && self.id == other.id
            && self.plural_id == other.plural_id
            && self.translation == other.translation
            && self.plural_translations == other.plural_translations
    }

    /// Copy every translation string from `other`.
    pub fn fill_translation_from(&mut self, other: &MessageEntry) {
        self.translation = other.translation.clone();
        self.plural_translations = other.plural_translations.clone();
    }

    /// Blank every translation string, keeping the plural slot count.
    pub fn clear_translation(&mut self) {
        self.translation.clear();
        for translation in &mut self.plural_translations {
            translation.clear();
        }
    }

    fn key(&self) -> (Option<&str>, &str) {
        (self.context.as_deref(), self.id.as_str())
    }
}

/// An ordered message catalog for one (resource, language) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Where the catalog is stored. Opaque to everything but the store.
    pub location: PathBuf,
    /// Comment lines above the header entry.
    pub header_comments: Vec<String>,
    /// Flags on the header entry (usually empty or `fuzzy`).
    pub header_flags: Vec<String>,
    pub metadata: Metadata,
    entries: Vec<MessageEntry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            header_comments: Vec::new(),
            header_flags: Vec::new(),
            metadata: Metadata::new(),
            entries: Vec::new(),
        }
    }

    /// Create a catalog from entries, rejecting duplicate live ids.
    pub fn with_entries(location: impl Into<PathBuf>, entries: Vec<MessageEntry>) -> Result<Self> {
        let mut catalog = Self::new(location);
        for entry in entries {
            catalog.push(entry)?;
        }
        Ok(catalog)
    }

    /// Append an entry, rejecting a duplicate live (context, id) pair.
    pub fn push(&mut self, entry: MessageEntry) -> Result<()> {
        if !entry.obsolete
            && self
                .entries
                .iter()
                .any(|existing| !existing.obsolete && existing.key() == entry.key())
        {
            return Err(Error::CatalogParse {
                path: self.location.clone(),
                line: 0,
                message: format!("duplicate message id '{}'", entry.id),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&MessageEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the translations of `source` into the entry at `index`.
    ///
    /// Returns `false` when `index` is out of range. Ids are never changed,
    /// so the uniqueness invariant holds.
    pub fn fill_translation(&mut self, index: usize, source: &MessageEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.fill_translation_from(source);
                true
            }
            None => false,
        }
    }

    /// Blank every translation (used before uploading a source catalog).
    pub fn strip_translations(&mut self) {
        for entry in &mut self.entries {
            entry.clear_translation();
        }
    }

    /// Number of live entries.
    pub fn string_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.obsolete).count()
    }

    pub fn translated_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_translated()).count()
    }

    pub fn untranslated_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_untranslated()).count()
    }

    pub fn fuzzy_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.obsolete && entry.is_fuzzy())
            .count()
    }

    /// Percentage of live entries that are translated, rounded down.
    pub fn percent_translated(&self) -> usize {
        let total = self.string_count();
        if total == 0 {
            return 100;
        }
        self.translated_count() * 100 / total
    }
}
