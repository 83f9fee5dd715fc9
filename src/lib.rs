//! # Catalog Sync Library
//!
//! This library keeps gettext message catalogs consistent between a local
//! version-controlled working copy and a remote translation management
//! service. It is used by the `catalog-sync` command-line tool but the
//! workflows are exposed as plain functions over trait objects, so they can
//! be driven against in-memory collaborators as well.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use catalog_sync::catalog::po;
//! use catalog_sync::config;
//!
//! let text = r#"msgid ""
//! msgstr "Language: de\n"
//!
//! msgid "Attribution"
//! msgstr "Namensnennung"
//!
//! msgid "ShareAlike"
//! msgstr ""
//! "#;
//! let catalog = po::parse(text, Path::new("de.po")).unwrap();
//! assert_eq!(catalog.string_count(), 2);
//! assert_eq!(catalog.translated_count(), 1);
//!
//! let config = config::parse(r#"
//! remote:
//!   organization: creativecommons
//!   project: CC
//!   team_id: 11342
//! resources:
//!   - slug: deeds_ux
//!     locale_dir: locale
//! "#).unwrap();
//! assert_eq!(config.resources[0].domain, "django");
//! ```
//!
//! ## Core Concepts
//!
//! - **Catalogs (`catalog`)**: ordered message entries plus typed header
//!   metadata, PO parsing/serialization, MO compilation and the
//!   [`catalog::store::CatalogStore`] seam for reading and writing them.
//! - **Configuration (`config`)**: the `.catalog-sync.yaml` schema: where the
//!   catalogs live, which remote organization/project they belong to, and
//!   how local language tags map to remote language codes.
//! - **Remote (`remote`)**: the [`remote::RemoteClient`] trait, an HTTP
//!   implementation and an in-memory one.
//! - **Repository (`repository`, `git`)**: dirty checks, branches and commits
//!   on the working copy.
//! - **Sync (`sync`)**: metadata normalization, date reconciliation,
//!   identity comparison, safe merge and the workflows built from them.
//!
//! ## Execution Flow
//!
//! Every workflow goes through [`sync::orchestrator::Orchestrator`]:
//!
//! 1.  **Precondition**: refuse to run on a dirty working copy.
//! 2.  **Discovery**: find the resources and languages in scope on disk.
//! 3.  **Per item**: normalize, compare, pull or push one catalog, turning
//!     unsupported languages and missing resources into logged skips.
//! 4.  **Follow-up**: pull and push finish with a normalize pass.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod language;
pub mod output;
pub mod remote;
pub mod repository;
pub mod suggestions;
pub mod sync;
pub mod timestamp;
