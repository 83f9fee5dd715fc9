//! # Error Handling
//!
//! This module defines the centralized error type for the `catalog-sync`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers every failure that aborts a run.
//!
//! Conditions that only skip one resource or language (an unsupported
//! language, a resource missing on the remote, a structurally diverged entry)
//! are deliberately *not* errors. They are modelled by
//! [`crate::sync::SkipReason`] and [`crate::sync::merge::StructuralMismatch`]
//! and reported by the orchestrator while the run continues.
//!
//! ## Key Components
//!
//! - **`Error`**: every fatal failure, with enough context (paths, URLs,
//!   commands) to diagnose it without a debugger.
//! - **`Result<T>`**: alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for catalog-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// A catalog was expected at a location that does not exist.
    #[error("Catalog not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A PO catalog could not be parsed.
    #[error("Catalog parse error in {}:{line}: {message}", path.display())]
    CatalogParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The configuration file is invalid.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The local working copy has uncommitted changes.
    ///
    /// A dirty copy signals a concurrent or unfinished prior run, so nothing
    /// this run changes could be attributed to it safely.
    #[error("Working copy has uncommitted changes: {}", path.display())]
    DirtyWorkingCopy { path: PathBuf },

    /// A network or API failure talking to the translation service.
    #[error("Transport error: {operation} {url} - {message}")]
    Transport {
        operation: String,
        url: String,
        message: String,
    },

    /// An asynchronous upload/download job on the translation service failed
    /// or did not finish in time.
    #[error("Remote job {job} failed: {message}")]
    RemoteJob { job: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// A resource named on the command line is not configured.
    #[error("Unknown resource: {slug}")]
    UnknownResource { slug: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a configuration error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            hint: None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
