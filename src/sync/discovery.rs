//! Local discovery
//!
//! Work out which resources and languages a run covers: configured resources
//! filtered by the `--domain` scope, and for each one the locales found on
//! disk filtered by the `--language` scope. Resources come out sorted by slug
//! and translations by language tag, so every run processes items in the same
//! order.

use std::path::PathBuf;

use log::debug;

use crate::catalog::store::{catalog_path, CatalogStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::language::{to_language, to_locale, LanguageMap};

/// Limits on what a run covers. `None` means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Resource slug, gettext domain or resource group.
    pub domain: Option<String>,
    /// Language tag (`pt-br`), locale name (`pt_BR`) or remote code.
    pub language: Option<String>,
}

impl Scope {
    pub fn all() -> Self {
        Self::default()
    }

    fn includes_language(&self, tag: &str, remote_code: &str) -> bool {
        match &self.language {
            None => true,
            Some(wanted) => to_language(wanted) == tag || wanted == remote_code,
        }
    }
}

/// One catalog of a resource on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCatalog {
    /// Local language tag.
    pub tag: String,
    pub remote_code: String,
    pub location: PathBuf,
}

/// A resource and the catalogs found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalResource {
    pub slug: String,
    pub name: String,
    pub source: LocalCatalog,
    pub translations: Vec<LocalCatalog>,
}

impl LocalResource {
    /// `"{name} ({slug}) {remote_code}"`, the prefix of every log line.
    pub fn label(&self, catalog: &LocalCatalog) -> String {
        format!("{} ({}) {}", self.name, self.slug, catalog.remote_code)
    }
}

/// Resources and translations in scope.
///
/// A `--domain` scope that matches no configured resource is an error.
pub fn discover(config: &Config, store: &dyn CatalogStore, scope: &Scope) -> Result<Vec<LocalResource>> {
    let languages: LanguageMap = config.language_map();
    let source_tag = to_language(&config.source_language);

    let mut selected: Vec<_> = config
        .resources
        .iter()
        .filter(|resource| match &scope.domain {
            Some(domain) => resource.matches_scope(domain),
            None => true,
        })
        .collect();
    if selected.is_empty() {
        if let Some(domain) = &scope.domain {
            return Err(Error::UnknownResource {
                slug: domain.clone(),
            });
        }
    }
    selected.sort_by(|a, b| a.slug.cmp(&b.slug));

    let mut resources = Vec::with_capacity(selected.len());
    for resource in selected {
        let locale_dir = config.locale_dir(resource);
        let source = LocalCatalog {
            tag: source_tag.clone(),
            remote_code: languages.remote_code(&source_tag),
            location: catalog_path(&locale_dir, &to_locale(&source_tag), &resource.domain),
        };

        let mut translations: Vec<LocalCatalog> = store
            .discover_locales(&locale_dir, &resource.domain)?
            .into_iter()
            .filter_map(|locale| {
                let tag = to_language(&locale);
                if tag == source_tag {
                    return None;
                }
                let remote_code = languages.remote_code(&tag);
                scope
                    .includes_language(&tag, &remote_code)
                    .then(|| LocalCatalog {
                        location: catalog_path(&locale_dir, &locale, &resource.domain),
                        tag,
                        remote_code,
                    })
            })
            .collect();
        translations.sort_by(|a, b| a.tag.cmp(&b.tag));

        debug!(
            "{}: {} translation(s) in {}",
            resource.slug,
            translations.len(),
            locale_dir.display()
        );
        resources.push(LocalResource {
            slug: resource.slug.clone(),
            name: resource.display_name().to_string(),
            source,
            translations,
        });
    }
    Ok(resources)
}
