//! # Local Catalog Store
//!
//! Persistence of catalogs in the local working copy. The [`CatalogStore`]
//! trait is the seam between the sync engine and the filesystem: the engine
//! only ever loads, saves, compiles and discovers catalogs through it, so tests
//! and benchmarks can swap in [`MemoryCatalogStore`].
//!
//! Layout follows gettext conventions:
//! `{locale_dir}/{locale}/LC_MESSAGES/{domain}.po`, with the compiled `.mo`
//! written next to the `.po`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::debug;

use super::{mo, po, Catalog};
use crate::error::{Error, Result};

/// Path of the catalog for `locale` and `domain` under `locale_dir`.
pub fn catalog_path(locale_dir: &Path, locale: &str, domain: &str) -> PathBuf {
    locale_dir
        .join(locale)
        .join("LC_MESSAGES")
        .join(format!("{}.po", domain))
}

/// Trait for catalog persistence - allows an in-memory store in tests
pub trait CatalogStore: Send + Sync {
    /// Read the raw text stored at `location`.
    ///
    /// Fails with [`Error::NotFound`] when nothing is stored there.
    fn read(&self, location: &Path) -> Result<String>;

    /// Replace whatever is stored at `location` with `bytes`, atomically.
    fn write(&self, location: &Path, bytes: &[u8]) -> Result<()>;

    /// Locale directory names under `locale_dir` that hold a `{domain}.po`,
    /// sorted.
    fn discover_locales(&self, locale_dir: &Path, domain: &str) -> Result<Vec<String>>;

    /// Load and parse the catalog at `location`.
    fn load(&self, location: &Path) -> Result<Catalog> {
        let text = self.read(location)?;
        po::parse(&text, location)
    }

    /// Serialize `catalog` back to its own location.
    fn save(&self, catalog: &Catalog) -> Result<()> {
        debug!("Writing {}", catalog.location.display());
        self.write(&catalog.location, po::serialize(catalog).as_bytes())
    }

    /// Compile `catalog` to MO bytes.
    fn compile(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        mo::compile(catalog)
    }

    /// Write the compiled `.mo` next to the catalog's `.po`.
    fn save_compiled(&self, catalog: &Catalog) -> Result<()> {
        let target = catalog.location.with_extension("mo");
        debug!("Compiling {}", target.display());
        self.write(&target, &self.compile(catalog)?)
    }
}

/// Catalog store backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileCatalogStore;

impl FileCatalogStore {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogStore for FileCatalogStore {
    fn read(&self, location: &Path) -> Result<String> {
        match fs::read(location) {
            Ok(bytes) => Ok(po::decode(&bytes, location)?.to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound {
                path: location.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, location: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = location.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut temp_name = location.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = location.with_file_name(temp_name);

        fs::write(&temp_path, bytes)?;
        if let Err(e) = fs::rename(&temp_path, location) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn discover_locales(&self, locale_dir: &Path, domain: &str) -> Result<Vec<String>> {
        let pattern = catalog_path(
            &PathBuf::from(glob::Pattern::escape(&locale_dir.to_string_lossy())),
            "*",
            &glob::Pattern::escape(domain),
        );
        let mut locales = Vec::new();
        for path in glob::glob(&pattern.to_string_lossy())?.flatten() {
            // {locale}/LC_MESSAGES/{domain}.po
            let locale = path
                .parent()
                .and_then(Path::parent)
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
            if let Some(locale) = locale {
                locales.push(locale);
            }
        }
        locales.sort();
        locales.dedup();
        Ok(locales)
    }
}

/// In-memory catalog store that counts writes.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    writes: AtomicUsize,
}

fn poisoned() -> Error {
    Error::Io(std::io::Error::other("catalog store lock poisoned"))
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with PO text. Does not count as a write.
    pub fn insert(&self, location: impl Into<PathBuf>, text: &str) -> Result<()> {
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(location.into(), text.as_bytes().to_vec());
        Ok(())
    }

    /// Raw bytes stored at `location`, if any.
    pub fn get(&self, location: &Path) -> Result<Option<Vec<u8>>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        Ok(files.get(location).cloned())
    }

    /// Number of writes since creation.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn read(&self, location: &Path) -> Result<String> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        let bytes = files.get(location).ok_or_else(|| Error::NotFound {
            path: location.to_path_buf(),
        })?;
        Ok(po::decode(bytes, location)?.to_string())
    }

    fn write(&self, location: &Path, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(location.to_path_buf(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn discover_locales(&self, locale_dir: &Path, domain: &str) -> Result<Vec<String>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        let file_name = format!("{}.po", domain);
        let mut locales: Vec<String> = files
            .keys()
            .filter(|path| path.file_name().is_some_and(|name| name == file_name.as_str()))
            .filter_map(|path| {
                let lc_messages = path.parent()?;
                let locale = lc_messages.parent()?;
                (lc_messages.file_name()? == "LC_MESSAGES" && locale.parent()? == locale_dir)
                    .then(|| locale.file_name())
                    .flatten()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .collect();
        locales.sort();
        locales.dedup();
        Ok(locales)
    }
}
