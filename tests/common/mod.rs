//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_minimal_config();
//!     fixture.command().arg("stats").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{catalogs, configs};
    pub use super::TestFixture;
}

/// Configuration snippets.
#[allow(dead_code)]
pub mod configs {
    /// One resource under `locale/`.
    pub const MINIMAL: &str = r#"
remote:
  organization: creativecommons
  project: CC
  team_id: 11342
resources:
  - slug: deeds_ux
    name: Deeds & UX
    locale_dir: locale
"#;

    /// Two resources in different groups.
    pub const TWO_RESOURCES: &str = r#"
remote:
  organization: creativecommons
  project: CC
  team_id: 11342
resources:
  - slug: deeds_ux
    locale_dir: locale
    group: deeds_ux
  - slug: by_4-0
    domain: by_4-0
    locale_dir: legalcode
    group: legal_code
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "remote: [unclosed";

    /// Valid YAML, but the organization is empty.
    pub const EMPTY_ORGANIZATION: &str = r#"
remote:
  organization: ""
  project: CC
  team_id: 11342
"#;
}

/// PO catalog snippets.
#[allow(dead_code)]
pub mod catalogs {
    pub const SOURCE: &str = r#"msgid ""
msgstr ""
"Language: en\n"

msgid "Attribution"
msgstr "Attribution"

msgid "ShareAlike"
msgstr "ShareAlike"
"#;

    /// Half translated, one fuzzy entry.
    pub const GERMAN: &str = r#"msgid ""
msgstr ""
"Language: de\n"

msgid "Attribution"
msgstr "Namensnennung"

#, fuzzy
msgid "ShareAlike"
msgstr "Weitergabe"
"#;

    pub const DUTCH: &str = r#"msgid ""
msgstr ""
"Language: nl\n"

msgid "Attribution"
msgstr ""

msgid "ShareAlike"
msgstr ""
"#;
}

/// A temporary directory with an optional `.catalog-sync.yaml` and catalogs.
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_config(configs::MINIMAL)
///     .with_catalog("locale", "de", "django", catalogs::GERMAN);
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.catalog-sync.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".catalog-sync.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add the minimal valid configuration.
    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    /// Add a catalog at `{locale_dir}/{locale}/LC_MESSAGES/{domain}.po`.
    #[allow(dead_code)]
    pub fn with_catalog(self, locale_dir: &str, locale: &str, domain: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("{locale_dir}/{locale}/LC_MESSAGES/{domain}.po"))
            .write_str(content)
            .expect("Failed to write catalog");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".catalog-sync.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory.
    ///
    /// Config and token variables from the outer environment are cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("catalog-sync");
        cmd.current_dir(self.path())
            .env_remove("CATALOG_SYNC_CONFIG")
            .env_remove("TRANSIFEX_API_TOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Create a command with the config file path argument.
    #[allow(dead_code)]
    pub fn command_with_config(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_minimal_config();
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_catalog() {
        let fixture = TestFixture::new().with_catalog("locale", "de", "django", catalogs::GERMAN);
        assert!(fixture
            .path()
            .join("locale/de/LC_MESSAGES/django.po")
            .exists());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::MINIMAL, configs::TWO_RESOURCES, configs::EMPTY_ORGANIZATION] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
