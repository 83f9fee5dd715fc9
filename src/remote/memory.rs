//! In-memory translation service
//!
//! Behaves like the hosted service closely enough for the orchestrator: stats
//! are derived from the stored catalogs, uploads replace content and bump the
//! revision date to a fixed clock, and every call is recorded so tests can
//! assert on what was (and was not) sent.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{
    RemoteClient, RemoteStats, ResourceDescriptor, ResourceStats, ResourceStatsMap,
    TranslationStatsMap, UploadSummary,
};
use crate::catalog::po;
use crate::error::{Error, Result};
use crate::timestamp::{parse_timestamp, Timestamp};

/// A call made against [`MemoryRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    ListResources,
    ResourceStats,
    TranslationStats,
    CreateResource(String),
    UploadSource(String),
    UploadTranslation(String, String),
    DownloadSource(String),
    DownloadTranslation(String, String),
}

impl RemoteCall {
    /// Whether the call can change remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RemoteCall::CreateResource(_)
                | RemoteCall::UploadSource(_)
                | RemoteCall::UploadTranslation(_, _)
        )
    }
}

#[derive(Debug, Clone)]
struct StoredTranslation {
    content: Vec<u8>,
    revised_at: Option<Timestamp>,
    counts: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct StoredResource {
    name: String,
    created_at: Option<Timestamp>,
    revised_at: Option<Timestamp>,
    source: Vec<u8>,
    translations: BTreeMap<String, StoredTranslation>,
}

#[derive(Debug)]
struct State {
    resources: BTreeMap<String, StoredResource>,
    excluded: Vec<String>,
    calls: Vec<RemoteCall>,
    now: Option<Timestamp>,
}

/// In-memory [`RemoteClient`].
#[derive(Debug)]
pub struct MemoryRemote {
    source_language: String,
    state: Mutex<State>,
}

fn not_found(operation: &str, slug: &str, language: Option<&str>) -> Error {
    Error::Transport {
        operation: operation.to_string(),
        url: match language {
            Some(language) => format!("memory://{}/{}", slug, language),
            None => format!("memory://{}", slug),
        },
        message: "404 Not Found".to_string(),
    }
}

fn counts(content: &[u8]) -> Result<(usize, usize, usize)> {
    let catalog = po::parse_bytes(content, Path::new("remote.po"))?;
    Ok((
        catalog.string_count(),
        catalog.translated_count(),
        catalog.untranslated_count(),
    ))
}

impl MemoryRemote {
    pub fn new(source_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            state: Mutex::new(State {
                resources: BTreeMap::new(),
                excluded: Vec::new(),
                calls: Vec::new(),
                now: parse_timestamp("2024-01-01T00:00:00Z"),
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("remote state lock poisoned")))
    }

    /// Resource slugs hidden from stats.
    pub fn with_excluded(self, excluded: &[&str]) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.excluded = excluded.iter().map(|s| s.to_string()).collect();
        }
        self
    }

    /// Timestamp given to uploads from now on.
    pub fn set_now(&self, now: &str) -> Result<()> {
        self.state()?.now = parse_timestamp(now);
        Ok(())
    }

    /// Seed a resource. Not recorded as a call.
    pub fn add_resource(
        &self,
        slug: &str,
        name: &str,
        source: &str,
        created_at: Option<&str>,
        revised_at: Option<&str>,
    ) -> Result<()> {
        self.state()?.resources.insert(
            slug.to_string(),
            StoredResource {
                name: name.to_string(),
                created_at: created_at.and_then(parse_timestamp),
                revised_at: revised_at.and_then(parse_timestamp),
                source: source.as_bytes().to_vec(),
                translations: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Seed a translation of an existing resource. Not recorded as a call.
    pub fn add_translation(
        &self,
        slug: &str,
        language: &str,
        content: impl AsRef<[u8]>,
        revised_at: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state()?;
        let resource = state
            .resources
            .get_mut(slug)
            .ok_or_else(|| not_found("seed", slug, Some(language)))?;
        resource.translations.insert(
            language.to_string(),
            StoredTranslation {
                content: content.as_ref().to_vec(),
                revised_at: revised_at.and_then(parse_timestamp),
                counts: None,
            },
        );
        Ok(())
    }

    /// Report fixed translated/untranslated counts instead of derived ones.
    pub fn set_translation_counts(
        &self,
        slug: &str,
        language: &str,
        translated: usize,
        untranslated: usize,
    ) -> Result<()> {
        let mut state = self.state()?;
        let translation = state
            .resources
            .get_mut(slug)
            .and_then(|resource| resource.translations.get_mut(language))
            .ok_or_else(|| not_found("seed", slug, Some(language)))?;
        translation.counts = Some((translated, untranslated));
        Ok(())
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Number of calls that could have changed remote state.
    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|call| call.is_mutation()).count()
    }

    /// Current content of a translation.
    pub fn translation_content(&self, slug: &str, language: &str) -> Option<String> {
        let state = self.state().ok()?;
        let translation = state.resources.get(slug)?.translations.get(language)?;
        String::from_utf8(translation.content.clone()).ok()
    }

    /// Current source content of a resource.
    pub fn source_content(&self, slug: &str) -> Option<String> {
        let state = self.state().ok()?;
        let resource = state.resources.get(slug)?;
        String::from_utf8(resource.source.clone()).ok()
    }

    fn record(&self, call: RemoteCall) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state()?;
        state.calls.push(call);
        Ok(state)
    }
}

impl RemoteClient for MemoryRemote {
    fn list_resources(&self) -> Result<Vec<ResourceDescriptor>> {
        let state = self.record(RemoteCall::ListResources)?;
        Ok(state
            .resources
            .iter()
            .map(|(slug, resource)| ResourceDescriptor {
                slug: slug.clone(),
                display_name: resource.name.clone(),
                source_language: self.source_language.clone(),
            })
            .collect())
    }

    fn get_resource_stats(&self) -> Result<ResourceStatsMap> {
        let state = self.record(RemoteCall::ResourceStats)?;
        let mut stats = ResourceStatsMap::new();
        for (slug, resource) in &state.resources {
            if state.excluded.contains(slug) {
                continue;
            }
            let (string_count, _, _) = counts(&resource.source)?;
            stats.insert(
                slug.clone(),
                ResourceStats {
                    slug: slug.clone(),
                    name: resource.name.clone(),
                    created_at: resource.created_at,
                    revised_at: resource.revised_at,
                    string_count,
                },
            );
        }
        Ok(stats)
    }

    fn get_translation_stats(&self) -> Result<TranslationStatsMap> {
        let state = self.record(RemoteCall::TranslationStats)?;
        let mut stats = TranslationStatsMap::new();
        for (slug, resource) in &state.resources {
            if state.excluded.contains(slug) {
                continue;
            }
            let languages = stats.entry(slug.clone()).or_default();
            for (language, translation) in &resource.translations {
                let (translated_count, untranslated_count) = match translation.counts {
                    Some(fixed) => fixed,
                    None => {
                        let (_, translated, untranslated) = counts(&translation.content)?;
                        (translated, untranslated)
                    }
                };
                languages.insert(
                    language.clone(),
                    RemoteStats {
                        resource_slug: slug.clone(),
                        language: language.clone(),
                        created_at: resource.created_at,
                        revised_at: translation.revised_at,
                        translated_count,
                        untranslated_count,
                    },
                );
            }
        }
        Ok(stats)
    }

    fn create_resource(&self, slug: &str, name: &str, source: &[u8]) -> Result<UploadSummary> {
        let (string_count, _, _) = counts(source)?;
        let mut state = self.record(RemoteCall::CreateResource(slug.to_string()))?;
        let now = state.now;
        state.resources.insert(
            slug.to_string(),
            StoredResource {
                name: name.to_string(),
                created_at: now,
                revised_at: now,
                source: source.to_vec(),
                translations: BTreeMap::new(),
            },
        );
        Ok(UploadSummary {
            created: string_count,
            ..UploadSummary::default()
        })
    }

    fn upload_source(&self, slug: &str, source: &[u8]) -> Result<UploadSummary> {
        let (string_count, _, _) = counts(source)?;
        let mut state = self.record(RemoteCall::UploadSource(slug.to_string()))?;
        let now = state.now;
        let resource = state
            .resources
            .get_mut(slug)
            .ok_or_else(|| not_found("upload_source", slug, None))?;
        let (previous, _, _) = counts(&resource.source)?;
        resource.source = source.to_vec();
        resource.revised_at = now;
        Ok(UploadSummary {
            created: string_count.saturating_sub(previous),
            updated: 0,
            skipped: string_count.min(previous),
            deleted: previous.saturating_sub(string_count),
        })
    }

    fn upload_translation(&self, slug: &str, language: &str, content: &[u8]) -> Result<UploadSummary> {
        let (_, translated, untranslated) = counts(content)?;
        let mut state = self.record(RemoteCall::UploadTranslation(
            slug.to_string(),
            language.to_string(),
        ))?;
        let now = state.now;
        let resource = state
            .resources
            .get_mut(slug)
            .ok_or_else(|| not_found("upload_translation", slug, Some(language)))?;
        let existed = resource.translations.contains_key(language);
        resource.translations.insert(
            language.to_string(),
            StoredTranslation {
                content: content.to_vec(),
                revised_at: now,
                counts: None,
            },
        );
        Ok(if existed {
            UploadSummary {
                updated: translated,
                skipped: untranslated,
                ..UploadSummary::default()
            }
        } else {
            UploadSummary {
                created: translated,
                skipped: untranslated,
                ..UploadSummary::default()
            }
        })
    }

    fn download_source(&self, slug: &str) -> Result<Vec<u8>> {
        let state = self.record(RemoteCall::DownloadSource(slug.to_string()))?;
        state
            .resources
            .get(slug)
            .map(|resource| resource.source.clone())
            .ok_or_else(|| not_found("download_source", slug, None))
    }

    fn download_translation(&self, slug: &str, language: &str) -> Result<Vec<u8>> {
        let state = self.record(RemoteCall::DownloadTranslation(
            slug.to_string(),
            language.to_string(),
        ))?;
        state
            .resources
            .get(slug)
            .and_then(|resource| resource.translations.get(language))
            .map(|translation| translation.content.clone())
            .ok_or_else(|| not_found("download_translation", slug, Some(language)))
    }
}
