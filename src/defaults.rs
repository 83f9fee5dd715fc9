//! Default values for catalog-sync configuration.
//!
//! This module provides centralized default values used by the configuration
//! schema and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File name searched for in the current directory.
pub const CONFIG_FILE_NAME: &str = ".catalog-sync.yaml";

/// Default REST endpoint of the translation service.
pub const DEFAULT_API_URL: &str = "https://rest.api.transifex.com";

/// Default web address used to build `Language-Team` URLs.
pub const DEFAULT_WEB_URL: &str = "https://www.transifex.com";

/// Value of `Last-Translator` that means "nobody".
pub const UNSET_TRANSLATOR: &str = "FULL NAME <EMAIL@ADDRESS>";

/// Resources on the remote that are never synchronized.
pub const DEFAULT_EXCLUDED_RESOURCES: &[&str] = &["cc-search", "deeds-choosers"];

pub fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

pub fn default_web_url() -> String {
    DEFAULT_WEB_URL.to_string()
}

pub fn default_source_language() -> String {
    "en".to_string()
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_timeout_secs() -> u64 {
    60
}

pub fn default_poll_interval_ms() -> u64 {
    1000
}

pub fn default_max_polls() -> u32 {
    120
}

pub fn default_domain() -> String {
    "django".to_string()
}

pub fn default_git_remote() -> String {
    "origin".to_string()
}

pub fn default_base_branch() -> String {
    "main".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_excluded_resources() -> Vec<String> {
    DEFAULT_EXCLUDED_RESOURCES.iter().map(|s| s.to_string()).collect()
}

/// Returns the per-user configuration file used when no project file exists.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/catalog-sync/config.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/catalog-sync/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\catalog-sync\config.yaml`
///
/// Returns `None` if the platform config directory cannot be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catalog-sync").join("config.yaml"))
}
