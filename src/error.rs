//! Domain-specific error types for the reconciliation engine.
//!
//! Source-tree validation failures are typed so the CLI can report each
//! one distinctly, and they abort the run before any mutation. Per-entry
//! refusals are *not* errors — see [`crate::outcome`]. Command handlers
//! convert these to [`anyhow::Error`] via `?` at the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum CoffleError {
    /// The source tree failed validation.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The persisted status records could not be used.
    #[error("Status error: {0}")]
    Status(#[from] StatusError),
}

/// Errors raised while validating the source tree's marker file.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The marker file is absent — the directory was never initialised.
    #[error("{path} is not a coffle source directory (run `coffle init` to initialise it)")]
    NotASource {
        /// The directory that was inspected.
        path: PathBuf,
    },

    /// The marker file exists but could not be read.
    #[error("cannot read source marker {path}: {source}")]
    MarkerUnreadable {
        /// Path to the marker file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The marker file is not valid TOML.
    #[error("source marker {path} is corrupt: {message}")]
    MarkerCorrupt {
        /// Path to the marker file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The marker file parsed but is not a table of keys.
    #[error("source marker {path} is corrupt: not a table")]
    MarkerNotATable {
        /// Path to the marker file.
        path: PathBuf,
    },

    /// The marker file has no `version` key.
    #[error("source marker {path} is corrupt: version missing")]
    VersionMissing {
        /// Path to the marker file.
        path: PathBuf,
    },

    /// The marker file's `version` key is not an integer.
    #[error("source marker {path} is corrupt: version is not an integer")]
    VersionNotInteger {
        /// Path to the marker file.
        path: PathBuf,
    },

    /// The source tree was initialised by a newer version of this tool.
    #[error("source format version {found} is newer than the supported version {supported}")]
    VersionTooNew {
        /// Version declared by the source tree.
        found: i64,
        /// Newest version this build understands.
        supported: i64,
    },
}

/// Errors raised while loading the persisted status records.
#[derive(Error, Debug)]
pub enum StatusError {
    /// The status file exists but could not be read.
    #[error("cannot read status file {path}: {source}")]
    Unreadable {
        /// Path to the status file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The status file is not valid TOML or has the wrong shape.
    #[error("status file {path} is corrupt: {message}")]
    Corrupt {
        /// Path to the status file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The status file was written by a newer version of this tool.
    #[error("status format version {found} is newer than the supported version {supported}")]
    VersionTooNew {
        /// Version declared by the status file.
        found: u32,
        /// Newest version this build understands.
        supported: u32,
    },
}
