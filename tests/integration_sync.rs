//! Integration tests for the sync workflows.
//!
//! These tests drive the public library API end to end against the
//! in-memory catalog store, remote and repository, so they need neither a
//! network nor a git binary.

use std::path::{Path, PathBuf};

use catalog_sync::catalog::store::{catalog_path, CatalogStore, MemoryCatalogStore};
use catalog_sync::catalog::{po, HeaderField};
use catalog_sync::config::{self, Config};
use catalog_sync::error::Error;
use catalog_sync::remote::memory::MemoryRemote;
use catalog_sync::remote::RemoteStats;
use catalog_sync::repository::{MemoryRepository, RepositoryCall};
use catalog_sync::sync::identity::translations_identical;
use catalog_sync::sync::merge::safe_merge;
use catalog_sync::sync::normalize::{normalize_metadata, CanonicalMetadata};
use catalog_sync::sync::orchestrator::{Options, Orchestrator};
use catalog_sync::sync::{SyncRun, Workflow};
use catalog_sync::timestamp::parse_timestamp;

const CONFIG: &str = r#"
remote:
  organization: creativecommons
  project: CC
  team_id: 11342
resources:
  - slug: deeds_ux
    name: Deeds & UX
    locale_dir: locale
"#;

const SOURCE: &str = r#"msgid ""
msgstr ""
"Project-Id-Version: deeds_ux\n"
"POT-Creation-Date: 2020-01-01 00:00:00+00:00\n"
"PO-Revision-Date: 2020-01-01 00:00:00+00:00\n"
"Language: en\n"
"Language-Team: https://www.transifex.com/creativecommons/CC/\n"

msgid "a"
msgstr "a"

msgid "b"
msgstr "b"
"#;

fn spanish(a: &str, b: &str) -> String {
    format!(
        "msgid \"\"\nmsgstr \"\"\n\"Language: es\\n\"\n\"Last-Translator: FULL NAME <EMAIL@ADDRESS>\\n\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\nmsgid \"a\"\nmsgstr \"{}\"\n\nmsgid \"b\"\nmsgstr \"{}\"\n",
        a, b
    )
}

fn es_path() -> PathBuf {
    catalog_path(Path::new("./locale"), "es", "django")
}

struct World {
    config: Config,
    store: MemoryCatalogStore,
    remote: MemoryRemote,
    repository: MemoryRepository,
}

impl World {
    fn new(local_es: &str, remote_es: &str) -> Self {
        let store = MemoryCatalogStore::new();
        store
            .insert(catalog_path(Path::new("./locale"), "en", "django"), SOURCE)
            .unwrap();
        store.insert(es_path(), local_es).unwrap();

        let remote = MemoryRemote::new("en");
        remote
            .add_resource(
                "deeds_ux",
                "Deeds & UX",
                SOURCE,
                Some("2020-01-01T00:00:00Z"),
                Some("2020-01-01T00:00:00Z"),
            )
            .unwrap();
        remote
            .add_translation("deeds_ux", "es", remote_es, Some("2021-05-01T00:00:00Z"))
            .unwrap();

        Self {
            config: config::parse(CONFIG).unwrap(),
            store,
            remote,
            repository: MemoryRepository::new(),
        }
    }

    fn run(&self, workflow: Workflow, dry_run: bool) -> catalog_sync::sync::RunReport {
        let orchestrator = Orchestrator::new(&self.config, &self.store, &self.remote, &self.repository);
        let mut run = SyncRun::new(dry_run);
        orchestrator
            .run(workflow, &Options::default(), &mut run)
            .unwrap()
    }

    fn local_es(&self) -> catalog_sync::catalog::Catalog {
        self.store.load(&es_path()).unwrap()
    }
}

#[test]
fn test_safe_merge_fills_gaps_only() {
    let mut local = po::parse(&spanish("", "hola"), Path::new("es.po")).unwrap();
    let remote = po::parse(
        &spanish("hello-translated", "remote-different"),
        Path::new("es.po"),
    )
    .unwrap();
    let run = SyncRun::new(false);
    let report = safe_merge(&mut local, &remote, &run, "Deeds & UX (deeds_ux) es");

    assert_eq!(report.filled.len(), 1);
    assert_eq!(local.get(0).unwrap().translation, "hello-translated");
    assert_eq!(local.get(1).unwrap().translation, "hola");
}

#[test]
fn test_unset_translator_is_removed() {
    let config = config::parse(CONFIG).unwrap();
    let mut catalog = po::parse(&spanish("", ""), Path::new("es.po")).unwrap();
    let canonical = CanonicalMetadata::for_catalog(&config, "deeds_ux", "es", false);
    let run = SyncRun::new(false);
    normalize_metadata(&mut catalog, &canonical, &run, "Deeds & UX (deeds_ux) es");

    assert!(catalog.metadata.get(HeaderField::LastTranslator).is_none());
    let text = po::serialize(&catalog);
    assert!(!text.contains("Last-Translator"));
}

#[test]
fn test_count_mismatch_is_not_identical() {
    let catalog = po::parse(
        "msgid \"\"\nmsgstr \"\"\n\"POT-Creation-Date: 2020-01-01 00:00:00+00:00\\n\"\n\"PO-Revision-Date: 2021-05-01 00:00:00+00:00\\n\"\n\nmsgid \"a\"\nmsgstr \"uno\"\n\nmsgid \"b\"\nmsgstr \"\"\n",
        Path::new("es.po"),
    )
    .unwrap();
    let stats = RemoteStats {
        resource_slug: "deeds_ux".to_string(),
        language: "es".to_string(),
        created_at: parse_timestamp("2020-01-01T00:00:00Z"),
        revised_at: parse_timestamp("2021-05-01T00:00:00Z"),
        translated_count: 2,
        untranslated_count: 0,
    };

    let identity = translations_identical(&catalog, &stats);
    assert!(!identity.is_identical());
    let text = identity.to_string();
    assert!(text.contains("PO File translated entries: 1"));
    assert!(text.contains("Remote translated entries: 2"));
}

#[test]
fn test_pull_overwrites_human_translation() {
    let world = World::new(&spanish("hola humano", ""), &spanish("hola remoto", "b remoto"));
    world.run(Workflow::Pull, false);

    let local = world.local_es();
    assert_eq!(local.get(0).unwrap().translation, "hola remoto");
    assert_eq!(local.get(1).unwrap().translation, "b remoto");
}

#[test]
fn test_normalize_is_idempotent() {
    let world = World::new(&spanish("", "mine"), &spanish("uno", "theirs"));
    let first = world.run(Workflow::Normalize, false);
    assert_eq!(first.filled, 1);
    let writes = world.store.writes();
    let mutations = world.remote.mutation_count();

    let second = world.run(Workflow::Normalize, false);
    assert_eq!(second.filled, 0);
    assert_eq!(second.metadata_changes, 0);
    assert_eq!(world.store.writes(), writes);
    assert_eq!(world.remote.mutation_count(), mutations);
}

#[test]
fn test_metadata_converges_after_normalize() {
    let world = World::new(&spanish("", ""), &spanish("uno", "dos"));
    world.run(Workflow::Normalize, false);

    let local = world.local_es();
    assert_eq!(local.metadata.get(HeaderField::Language), Some("es"));
    assert_eq!(
        local.metadata.get(HeaderField::LanguageTeam),
        Some("https://www.transifex.com/creativecommons/teams/11342/es/")
    );
    assert_eq!(local.metadata.get(HeaderField::ProjectIdVersion), Some("deeds_ux"));
    assert!(local.metadata.get(HeaderField::LastTranslator).is_none());
    assert_eq!(
        local.metadata.get_passthrough("Content-Type"),
        Some("text/plain; charset=UTF-8")
    );
}

#[test]
fn test_revision_date_follows_remote_when_local_unset() {
    let world = World::new(&spanish("uno", "dos"), &spanish("uno", "dos"));
    world.run(Workflow::Normalize, false);
    assert_eq!(
        world.local_es().metadata.revision_date(),
        parse_timestamp("2021-05-01T00:00:00Z")
    );
    assert_eq!(
        world.local_es().metadata.creation_date(),
        parse_timestamp("2020-01-01T00:00:00Z")
    );
}

#[test]
fn test_dry_run_writes_nothing_anywhere() {
    let world = World::new(&spanish("", "mine"), &spanish("uno", "theirs"));
    for workflow in [Workflow::Normalize, Workflow::Pull, Workflow::Push] {
        world.run(workflow, true);
    }
    assert_eq!(world.store.writes(), 0);
    assert_eq!(world.remote.mutation_count(), 0);
    assert!(world
        .repository
        .calls()
        .iter()
        .all(|call| *call == RepositoryCall::IsDirty));
}

#[test]
fn test_dirty_working_copy_is_fatal() {
    let world = World::new(&spanish("", ""), &spanish("", ""));
    world.repository.set_dirty(true);
    let orchestrator = Orchestrator::new(&world.config, &world.store, &world.remote, &world.repository);
    let mut run = SyncRun::new(false);
    let result = orchestrator.run(Workflow::Normalize, &Options::default(), &mut run);
    assert!(matches!(result, Err(Error::DirtyWorkingCopy { .. })));
}
