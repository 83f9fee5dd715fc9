//! # Local Working Copy
//!
//! The sync engine needs exactly three things from version control: know
//! whether the working copy is clean, put a branch in place before a pull,
//! and record the result afterwards. The [`Repository`] trait captures those,
//! so the orchestrator can be driven by the system `git` in production
//! ([`GitRepository`]) and by [`MemoryRepository`] in tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::config::GitConfig;
use crate::error::{Error, Result};
use crate::git;

/// Trait for version-control operations - allows mocking in tests
pub trait Repository: Send + Sync {
    /// Tracked files have uncommitted changes.
    fn is_dirty(&self) -> Result<bool>;

    /// Update remote-tracking refs.
    fn fetch(&self) -> Result<()>;

    /// Check out `name`, creating it from the base branch when needed.
    fn checkout_or_create_branch(&self, name: &str) -> Result<()>;

    /// Commit every change in the working copy and push the current branch.
    fn commit_and_push(&self, message: &str) -> Result<()>;

    /// Whether there is anything for [`Repository::commit_and_push`] to
    /// record, new files included.
    fn has_changes(&self) -> Result<bool> {
        self.is_dirty()
    }
}

/// [`Repository`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
    settings: GitConfig,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>, settings: GitConfig) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Repository for GitRepository {
    fn is_dirty(&self) -> Result<bool> {
        git::is_dirty(&self.root)
    }

    fn fetch(&self) -> Result<()> {
        git::fetch(&self.root, &self.settings.remote)
    }

    fn checkout_or_create_branch(&self, name: &str) -> Result<()> {
        git::checkout_or_create_branch(
            &self.root,
            &self.settings.remote,
            name,
            &self.settings.base_branch,
        )
    }

    fn commit_and_push(&self, message: &str) -> Result<()> {
        git::commit_all(&self.root, ".", message)?;
        if self.settings.push {
            git::push_current_branch(&self.root, &self.settings.remote)?;
        } else {
            warn!("Push disabled; commit left on the local branch");
        }
        info!("Committed: {}", message);
        Ok(())
    }

    fn has_changes(&self) -> Result<bool> {
        git::has_changes_under(&self.root, ".")
    }
}

/// A call made against [`MemoryRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    IsDirty,
    Fetch,
    Checkout(String),
    CommitAndPush(String),
}

/// In-memory [`Repository`] with a settable dirty flag.
///
/// Committing clears the flag. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    dirty: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<RepositoryCall>>>,
}

fn poisoned() -> Error {
    Error::Io(std::io::Error::other("repository lock poisoned"))
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository that starts out dirty.
    pub fn dirty() -> Self {
        let repository = Self::default();
        repository.set_dirty(true);
        repository
    }

    pub fn set_dirty(&self, dirty: bool) {
        if let Ok(mut flag) = self.dirty.lock() {
            *flag = dirty;
        }
    }

    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: RepositoryCall) -> Result<()> {
        self.calls.lock().map_err(|_| poisoned())?.push(call);
        Ok(())
    }
}

impl Repository for MemoryRepository {
    fn is_dirty(&self) -> Result<bool> {
        self.record(RepositoryCall::IsDirty)?;
        Ok(*self.dirty.lock().map_err(|_| poisoned())?)
    }

    fn fetch(&self) -> Result<()> {
        self.record(RepositoryCall::Fetch)
    }

    fn checkout_or_create_branch(&self, name: &str) -> Result<()> {
        self.record(RepositoryCall::Checkout(name.to_string()))
    }

    fn commit_and_push(&self, message: &str) -> Result<()> {
        self.record(RepositoryCall::CommitAndPush(message.to_string()))?;
        *self.dirty.lock().map_err(|_| poisoned())? = false;
        Ok(())
    }
}
