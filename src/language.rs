//! Language tags and remote language codes
//!
//! Three spellings of the same language are in play:
//!
//! - the local language tag, a lowercase IETF tag (`pt-br`, `zh-hans`),
//! - the locale directory name catalogs are stored under (`pt_BR`, `zh_Hans`),
//! - the remote language code the translation service uses (`pt_BR`,
//!   `zh-Hans`).
//!
//! Tags and locale names convert mechanically. Remote codes equal the tag
//! unless the [`LanguageMap`] says otherwise.

use std::collections::BTreeMap;

/// Built-in tag to remote code exceptions.
pub const DEFAULT_LANGUAGE_MAP: &[(&str, &str)] = &[
    ("en-gb", "en_GB"),
    ("pt-br", "pt_BR"),
    ("zh-hans", "zh-Hans"),
    ("zh-hant", "zh-Hant"),
];

/// Turn a language tag into a locale directory name (`pt-br` -> `pt_BR`).
///
/// Region subtags are upper-cased, script subtags (longer than two letters)
/// are title-cased. Anything after a second subtag is kept as is.
pub fn to_locale(tag: &str) -> String {
    let lower = tag.to_lowercase();
    let Some((language, rest)) = lower.split_once('-') else {
        return tag.to_lowercase();
    };
    let (region, tail) = match rest.split_once('-') {
        Some((region, tail)) => (region, Some(tail)),
        None => (rest, None),
    };
    let mut region = if region.len() > 2 {
        title_case(region)
    } else {
        region.to_uppercase()
    };
    if let Some(tail) = tail {
        region.push('-');
        region.push_str(tail);
    }
    format!("{}_{}", language, region)
}

/// Turn a locale directory name into a language tag (`pt_BR` -> `pt-br`).
pub fn to_language(locale: &str) -> String {
    match locale.split_once('_') {
        Some((language, region)) => format!("{}-{}", language.to_lowercase(), region.to_lowercase()),
        None => locale.to_lowercase(),
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bidirectional mapping between local language tags and remote codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMap {
    to_remote: BTreeMap<String, String>,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self {
            to_remote: DEFAULT_LANGUAGE_MAP
                .iter()
                .map(|(tag, code)| (tag.to_string(), code.to_string()))
                .collect(),
        }
    }
}

impl LanguageMap {
    /// The built-in map extended (and overridden) by `overrides`.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut map = Self::default();
        for (tag, code) in overrides {
            map.to_remote.insert(tag.to_lowercase(), code.clone());
        }
        map
    }

    /// Remote code for a local tag.
    pub fn remote_code(&self, tag: &str) -> String {
        let tag = tag.to_lowercase();
        self.to_remote.get(&tag).cloned().unwrap_or(tag)
    }

    /// Local tag for a remote code.
    pub fn local_tag(&self, code: &str) -> String {
        self.to_remote
            .iter()
            .find(|(_, remote)| remote.as_str() == code)
            .map(|(tag, _)| tag.clone())
            .unwrap_or_else(|| to_language(code))
    }

    pub fn len(&self) -> usize {
        self.to_remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_remote.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_locale() {
        assert_eq!(to_locale("en"), "en");
        assert_eq!(to_locale("pt-br"), "pt_BR");
        assert_eq!(to_locale("zh-hans"), "zh_Hans");
        assert_eq!(to_locale("sr-latn"), "sr_Latn");
        assert_eq!(to_locale("sr-latn-rs"), "sr_Latn-rs");
        assert_eq!(to_locale("EN-GB"), "en_GB");
    }

    #[test]
    fn test_to_language() {
        assert_eq!(to_language("de"), "de");
        assert_eq!(to_language("pt_BR"), "pt-br");
        assert_eq!(to_language("zh_Hans"), "zh-hans");
    }

    #[test]
    fn test_locale_round_trip() {
        for tag in ["de", "pt-br", "zh-hant", "en-gb", "sr-latn"] {
            assert_eq!(to_language(&to_locale(tag)), tag);
        }
    }

    #[test]
    fn test_default_map() {
        let map = LanguageMap::default();
        assert_eq!(map.remote_code("pt-br"), "pt_BR");
        assert_eq!(map.remote_code("zh-hans"), "zh-Hans");
        assert_eq!(map.remote_code("de"), "de");
        assert_eq!(map.local_tag("zh-Hant"), "zh-hant");
        assert_eq!(map.local_tag("nl"), "nl");
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("sr-latn".to_string(), "sr@latin".to_string());
        overrides.insert("pt-br".to_string(), "pt-BR".to_string());
        let map = LanguageMap::with_overrides(&overrides);
        assert_eq!(map.remote_code("sr-latn"), "sr@latin");
        assert_eq!(map.remote_code("pt-br"), "pt-BR");
        assert_eq!(map.local_tag("sr@latin"), "sr-latn");
        assert_eq!(map.len(), 5);
    }
}
