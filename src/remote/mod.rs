//! # Remote Resource Client
//!
//! The translation service as seen by the sync engine. The engine never talks
//! HTTP directly; it goes through the [`RemoteClient`] trait so the transport
//! can be swapped for [`memory::MemoryRemote`] in tests.
//!
//! The service keeps one *resource* per translatable unit, identified by a
//! slug, holding the source strings plus one translation per language.
//! Resource and translation timestamps are read-only through the API.
//!
//! ## Implementations
//!
//! - [`transifex::TransifexClient`]: Transifex REST API 3.0.
//! - [`memory::MemoryRemote`]: in-memory service that records every call.

pub mod memory;
pub mod transifex;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::timestamp::Timestamp;

/// A resource as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub slug: String,
    pub display_name: String,
    pub source_language: String,
}

/// Remote metadata of a resource's source strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStats {
    pub slug: String,
    pub name: String,
    pub created_at: Option<Timestamp>,
    pub revised_at: Option<Timestamp>,
    pub string_count: usize,
}

/// Remote metadata of one translation of a resource.
///
/// The service only dates resources, so `created_at` is the resource's
/// creation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStats {
    pub resource_slug: String,
    pub language: String,
    pub created_at: Option<Timestamp>,
    pub revised_at: Option<Timestamp>,
    pub translated_count: usize,
    pub untranslated_count: usize,
}

/// Resource stats keyed by slug.
pub type ResourceStatsMap = BTreeMap<String, ResourceStats>;

/// Translation stats keyed by slug, then remote language code.
pub type TranslationStatsMap = BTreeMap<String, BTreeMap<String, RemoteStats>>;

/// Outcome of an upload job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
}

impl UploadSummary {
    /// Whether the upload created or updated anything.
    pub fn changed(&self) -> bool {
        self.created > 0 || self.updated > 0
    }
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created: {}, updated: {}, skipped: {}, deleted: {}",
            self.created, self.updated, self.skipped, self.deleted
        )
    }
}

/// Trait for the translation service - allows mocking in tests
///
/// Every method performs I/O; callers cache the stats themselves.
pub trait RemoteClient: Send + Sync {
    /// Every resource of the project.
    fn list_resources(&self) -> Result<Vec<ResourceDescriptor>>;

    /// Stats of every (non-excluded) resource.
    fn get_resource_stats(&self) -> Result<ResourceStatsMap>;

    /// Stats of every translation of every (non-excluded) resource.
    fn get_translation_stats(&self) -> Result<TranslationStatsMap>;

    /// Create a resource and upload its source strings.
    fn create_resource(&self, slug: &str, name: &str, source: &[u8]) -> Result<UploadSummary>;

    /// Replace the source strings of an existing resource.
    fn upload_source(&self, slug: &str, source: &[u8]) -> Result<UploadSummary>;

    /// Replace one translation of a resource.
    fn upload_translation(&self, slug: &str, language: &str, content: &[u8]) -> Result<UploadSummary>;

    /// The source catalog as PO bytes.
    fn download_source(&self, slug: &str) -> Result<Vec<u8>>;

    /// One translation as PO bytes.
    fn download_translation(&self, slug: &str, language: &str) -> Result<Vec<u8>>;
}
