//! Compilation of a catalog into the GNU MO binary format.
//!
//! Only entries `msgfmt` would emit are compiled: live, not fuzzy and fully
//! translated. The trimmed catalog is handed to `polib`, which writes the
//! binary layout.

use std::fs;

use polib::{mo_file, po_file};
use tempfile::TempDir;

use super::{po, Catalog, MessageEntry};
use crate::error::{Error, Result};

/// The entries of `catalog` that end up in the MO file, stripped of comments
/// and flags.
fn compilable(catalog: &Catalog) -> Result<Catalog> {
    let entries = catalog
        .entries()
        .iter()
        .filter(|entry| entry.is_translated())
        .map(|entry| MessageEntry {
            comments: Vec::new(),
            flags: Vec::new(),
            ..entry.clone()
        })
        .collect();
    let mut trimmed = Catalog::with_entries(catalog.location.clone(), entries)?;
    trimmed.metadata = catalog.metadata.clone();
    Ok(trimmed)
}

/// Compile `catalog` into MO bytes.
pub fn compile(catalog: &Catalog) -> Result<Vec<u8>> {
    let scratch = TempDir::new()?;
    let po_path = scratch.path().join("messages.po");
    let mo_path = scratch.path().join("messages.mo");

    fs::write(&po_path, po::serialize(&compilable(catalog)?))?;
    let parsed = po_file::parse(&po_path).map_err(|e| Error::CatalogParse {
        path: catalog.location.clone(),
        line: 0,
        message: format!("cannot compile: {}", e),
    })?;
    mo_file::write(&parsed, &mo_path)?;
    Ok(fs::read(&mo_path)?)
}
