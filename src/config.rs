//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.catalog-sync.yaml` configuration file, and the logic for locating,
//! parsing and validating it.
//!
//! ## Example
//!
//! ```yaml
//! data_dir: ../cc-legal-tools-data
//! source_language: en
//! remote:
//!   organization: creativecommons
//!   project: CC
//!   team_id: 11342
//! git:
//!   base_branch: main
//! language_map:
//!   sr-latn: sr@latin
//! resources:
//!   - slug: deeds_ux
//!     name: Deeds & UX
//!     domain: django
//!     locale_dir: locale
//!     group: deeds_ux
//!   - slug: by_4-0
//!     name: CC BY 4.0
//!     domain: by_4-0
//!     locale_dir: legalcode
//!     group: legal_code
//! ```
//!
//! ## Key Components
//!
//! - **`Config`**: the whole file. Relative `data_dir` values are resolved
//!   against the directory the file was loaded from.
//! - **`RemoteConfig`**: where the translation service lives and how long to
//!   wait for it.
//! - **`ResourceConfig`**: one translatable resource and where its catalogs
//!   are stored locally.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::language::LanguageMap;

/// Remote resource slugs.
const SLUG_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Connection settings for the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// REST API base URL.
    #[serde(default = "defaults::default_api_url")]
    pub api_url: String,
    /// Web base URL, used for `Language-Team` links.
    #[serde(default = "defaults::default_web_url")]
    pub web_url: String,
    /// Organization slug.
    pub organization: String,
    /// Project slug.
    pub project: String,
    /// Numeric id of the translator team.
    pub team_id: u64,
    /// HTTP timeout per request.
    #[serde(default = "defaults::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between polls of an asynchronous upload or download.
    #[serde(default = "defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls before an asynchronous job is considered failed.
    #[serde(default = "defaults::default_max_polls")]
    pub max_polls: u32,
}

/// A translatable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Stable identifier, shared with the remote.
    pub slug: String,
    /// Display name. Defaults to the slug.
    #[serde(default)]
    pub name: Option<String>,
    /// Gettext domain (catalog file stem).
    #[serde(default = "defaults::default_domain")]
    pub domain: String,
    /// Directory holding `{locale}/LC_MESSAGES/{domain}.po`, relative to
    /// `data_dir`.
    pub locale_dir: PathBuf,
    /// Optional group name usable as a `--domain` scope.
    #[serde(default)]
    pub group: Option<String>,
}

impl ResourceConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }

    /// Whether a `--domain` scope selects this resource.
    pub fn matches_scope(&self, scope: &str) -> bool {
        self.slug == scope || self.domain == scope || self.group.as_deref() == Some(scope)
    }
}

/// The local working copy's git setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Remote fetched from and pushed to.
    #[serde(default = "defaults::default_git_remote")]
    pub remote: String,
    /// Branch new branches start from.
    #[serde(default = "defaults::default_base_branch")]
    pub base_branch: String,
    /// Push after committing.
    #[serde(default = "defaults::default_true")]
    pub push: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: defaults::default_git_remote(),
            base_branch: defaults::default_base_branch(),
            push: true,
        }
    }
}

/// The configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the local working copy.
    #[serde(default = "defaults::default_data_dir")]
    pub data_dir: PathBuf,
    /// Language tag of the source catalogs.
    #[serde(default = "defaults::default_source_language")]
    pub source_language: String,
    pub remote: RemoteConfig,
    #[serde(default)]
    pub git: GitConfig,
    /// Local tag to remote code exceptions, on top of the built-in ones.
    #[serde(default)]
    pub language_map: BTreeMap<String, String>,
    /// Remote resources ignored when reading statistics.
    #[serde(default = "defaults::default_excluded_resources")]
    pub excluded_resources: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// Parse and validate configuration text.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml_content)?;
    config.validate()?;
    Ok(config)
}

/// Find the configuration file.
///
/// An explicit path wins (and must exist). Otherwise `.catalog-sync.yaml` in
/// the current directory, then the per-user config file.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(Error::NotFound {
                path: path.to_path_buf(),
            })
        };
    }

    let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }
    match defaults::user_config_path() {
        Some(user) if user.exists() => Ok(user),
        _ => Err(Error::NotFound { path: local }),
    }
}

/// Load, parse and validate the file at `path`.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    let mut config = parse(&content)?;
    if config.data_dir.is_relative() {
        if let Some(base) = path.parent() {
            config.data_dir = base.join(&config.data_dir);
        }
    }
    Ok(config)
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.remote.organization.trim().is_empty() {
            return Err(Error::Config {
                message: "remote.organization is empty".to_string(),
                hint: Some("Set 'organization:' in the remote block".to_string()),
            });
        }
        if self.remote.project.trim().is_empty() {
            return Err(Error::Config {
                message: "remote.project is empty".to_string(),
                hint: Some("Set 'project:' in the remote block".to_string()),
            });
        }
        url::Url::parse(&self.remote.api_url)?;
        url::Url::parse(&self.remote.web_url)?;
        if self.remote.max_polls == 0 {
            return Err(Error::config("remote.max_polls must be at least 1"));
        }
        if self.source_language.trim().is_empty() {
            return Err(Error::config("source_language is empty"));
        }

        let slug_pattern = Regex::new(SLUG_PATTERN)
            .map_err(|e| Error::config(format!("invalid slug pattern: {}", e)))?;
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.slug.trim().is_empty() {
                return Err(Error::Config {
                    message: "resource with an empty slug".to_string(),
                    hint: Some("Every entry under 'resources:' needs a 'slug:'".to_string()),
                });
            }
            if !slug_pattern.is_match(&resource.slug) {
                return Err(Error::Config {
                    message: format!("invalid resource slug '{}'", resource.slug),
                    hint: Some("Slugs may only contain letters, digits, '-' and '_'".to_string()),
                });
            }
            if resource.domain.trim().is_empty() {
                return Err(Error::config(format!("resource {} has an empty domain", resource.slug)));
            }
            if !seen.insert(resource.slug.as_str()) {
                return Err(Error::config(format!("duplicate resource slug '{}'", resource.slug)));
            }
        }
        Ok(())
    }

    /// Look up a configured resource.
    pub fn resource(&self, slug: &str) -> Result<&ResourceConfig> {
        self.resources
            .iter()
            .find(|resource| resource.slug == slug)
            .ok_or_else(|| Error::UnknownResource {
                slug: slug.to_string(),
            })
    }

    /// Absolute-ish directory holding a resource's locales.
    pub fn locale_dir(&self, resource: &ResourceConfig) -> PathBuf {
        self.data_dir.join(&resource.locale_dir)
    }

    pub fn language_map(&self) -> LanguageMap {
        LanguageMap::with_overrides(&self.language_map)
    }

    pub fn is_excluded(&self, slug: &str) -> bool {
        self.excluded_resources.iter().any(|excluded| excluded == slug)
    }

    /// Canonical `Language-Team` value.
    ///
    /// The source language points at the project, every other language at
    /// its team page.
    pub fn language_team_url(&self, remote_code: &str, is_source: bool) -> String {
        let web = self.remote.web_url.trim_end_matches('/');
        if is_source {
            format!("{}/{}/{}/", web, self.remote.organization, self.remote.project)
        } else {
            format!(
                "{}/{}/teams/{}/{}/",
                web, self.remote.organization, self.remote.team_id, remote_code
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
remote:
  organization: creativecommons
  project: CC
  team_id: 11342
resources:
  - slug: deeds_ux
    name: Deeds & UX
    locale_dir: locale
    group: deeds_ux
  - slug: by_4-0
    domain: by_4-0
    locale_dir: legalcode
    group: legal_code
"#;

    #[test]
    fn test_parse_applies_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.source_language, "en");
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.remote.api_url, defaults::DEFAULT_API_URL);
        assert_eq!(config.remote.timeout_secs, 60);
        assert_eq!(config.excluded_resources, vec!["cc-search", "deeds-choosers"]);
        assert_eq!(config.resources[0].domain, "django");
        assert_eq!(config.git, GitConfig::default());
        assert_eq!(config.git.base_branch, "main");
        assert_eq!(config.resources[1].display_name(), "by_4-0");
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let yaml = MINIMAL.replace("team_id: 11342", "team_id: 11342\n  colour: blue");
        assert!(matches!(parse(&yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_parse_rejects_duplicate_slugs() {
        let yaml = MINIMAL.replace("slug: by_4-0", "slug: deeds_ux");
        match parse(&yaml) {
            Err(Error::Config { message, .. }) => assert!(message.contains("duplicate")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_slug() {
        let yaml = MINIMAL.replace("slug: by_4-0", "slug: by 4.0");
        match parse(&yaml) {
            Err(Error::Config { message, hint }) => {
                assert!(message.contains("by 4.0"));
                assert!(hint.is_some());
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty_organization() {
        let yaml = MINIMAL.replace("organization: creativecommons", "organization: \"\"");
        match parse(&yaml) {
            Err(Error::Config { hint, .. }) => assert!(hint.is_some()),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        let yaml = MINIMAL.replace("project: CC", "project: CC\n  api_url: not a url");
        assert!(matches!(parse(&yaml), Err(Error::UrlParse(_))));
    }

    #[test]
    fn test_scope_matching() {
        let config = parse(MINIMAL).unwrap();
        let deeds = config.resource("deeds_ux").unwrap();
        assert!(deeds.matches_scope("deeds_ux"));
        assert!(deeds.matches_scope("django"));
        let legal = config.resource("by_4-0").unwrap();
        assert!(legal.matches_scope("legal_code"));
        assert!(!legal.matches_scope("deeds_ux"));
        assert!(matches!(
            config.resource("nope"),
            Err(Error::UnknownResource { .. })
        ));
    }

    #[test]
    fn test_language_team_url() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(
            config.language_team_url("en", true),
            "https://www.transifex.com/creativecommons/CC/"
        );
        assert_eq!(
            config.language_team_url("pt_BR", false),
            "https://www.transifex.com/creativecommons/teams/11342/pt_BR/"
        );
    }

    #[test]
    fn test_load_resolves_data_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".catalog-sync.yaml");
        std::fs::write(&path, format!("data_dir: data\n{}", MINIMAL)).unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.data_dir, temp.path().join("data"));
        assert_eq!(
            config.locale_dir(config.resource("deeds_ux").unwrap()),
            temp.path().join("data").join("locale")
        );
    }

    #[test]
    fn test_locate_explicit_missing() {
        let result = locate(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_language_map_overrides() {
        let yaml = format!("{}language_map:\n  sr-latn: sr@latin\n", MINIMAL);
        let config = parse(&yaml).unwrap();
        assert_eq!(config.language_map().remote_code("sr-latn"), "sr@latin");
        assert_eq!(config.language_map().remote_code("pt-br"), "pt_BR");
    }
}
