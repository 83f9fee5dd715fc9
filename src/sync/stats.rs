//! Local translation statistics
//!
//! Per-language counts for the catalogs in scope, read from disk only.

use std::fmt;

use serde::Serialize;

use super::discovery::{discover, Scope};
use crate::catalog::store::CatalogStore;
use crate::config::Config;
use crate::error::Result;

/// Counts for one translation catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub resource: String,
    pub language: String,
    pub messages: usize,
    pub translated: usize,
    pub fuzzy: usize,
    pub percent_translated: usize,
}

impl fmt::Display for LanguageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<10} {:>6} {:>6} {:>6} {:>4}%",
            self.resource,
            self.language,
            self.messages,
            self.translated,
            self.fuzzy,
            self.percent_translated
        )
    }
}

/// Collect stats for every translation in scope, skipping the source
/// catalogs.
pub fn collect_stats(
    config: &Config,
    store: &dyn CatalogStore,
    scope: &Scope,
) -> Result<Vec<LanguageStats>> {
    let mut stats = Vec::new();
    for resource in discover(config, store, scope)? {
        for translation in &resource.translations {
            let catalog = store.load(&translation.location)?;
            stats.push(LanguageStats {
                resource: resource.slug.clone(),
                language: translation.tag.clone(),
                messages: catalog.string_count(),
                translated: catalog.translated_count(),
                fuzzy: catalog.fuzzy_count(),
                percent_translated: catalog.percent_translated(),
            });
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::{catalog_path, MemoryCatalogStore};
    use crate::config;
    use std::path::Path;

    const CONFIG: &str = r#"
remote:
  organization: creativecommons
  project: CC
  team_id: 11342
resources:
  - slug: deeds_ux
    locale_dir: locale
"#;

    const DE: &str = r#"msgid ""
msgstr "Language: de\n"

msgid "a"
msgstr "A"

#, fuzzy
msgid "b"
msgstr "B"

msgid "c"
msgstr ""
"#;

    #[test]
    fn test_collect_stats() {
        let config = config::parse(CONFIG).unwrap();
        let store = MemoryCatalogStore::new();
        let dir = Path::new("./locale");
        store.insert(catalog_path(dir, "en", "django"), DE).unwrap();
        store.insert(catalog_path(dir, "de", "django"), DE).unwrap();

        let stats = collect_stats(&config, &store, &Scope::all()).unwrap();
        assert_eq!(
            stats,
            vec![LanguageStats {
                resource: "deeds_ux".to_string(),
                language: "de".to_string(),
                messages: 3,
                translated: 1,
                fuzzy: 1,
                percent_translated: 33,
            }]
        );
        let json = serde_json::to_value(&stats[0]).unwrap();
        assert_eq!(json["percent_translated"], 33);
    }
}
