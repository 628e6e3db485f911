//! Persisted cross-run status records.
//!
//! Some reconciliation decisions cannot be derived from the filesystem
//! alone — most notably whether an entry was skipped on the previous run,
//! which determines whether an uninstall should restore anything. These
//! records survive between invocations in a TOML file inside the work
//! directory, read once at repository construction and rewritten wholesale
//! at the end of every run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StatusError;
use crate::fsutil;

/// Newest status file format this build understands.
pub const STATUS_FORMAT_VERSION: u32 = 1;

/// Per-entry persisted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    /// Whether the entry's most recent build was skipped by the renderer.
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, EntryStatus>,
}

/// The status records for one source tree.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    entries: BTreeMap<String, EntryStatus>,
}

impl StatusStore {
    /// Load the records from `path`; an absent file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns a typed error when the file exists but is unreadable,
    /// malformed, or declares a newer format version than supported.
    pub fn load(path: PathBuf) -> Result<Self, StatusError> {
        if !fsutil::present(&path) {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let text = std::fs::read_to_string(&path).map_err(|source| {
            StatusError::Unreadable {
                path: path.clone(),
                source,
            }
        })?;
        let file: StatusFile =
            toml::from_str(&text).map_err(|e| StatusError::Corrupt {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if file.version > STATUS_FORMAT_VERSION {
            return Err(StatusError::VersionTooNew {
                found: file.version,
                supported: STATUS_FORMAT_VERSION,
            });
        }
        Ok(Self {
            path,
            entries: file.entries,
        })
    }

    /// Whether the entry at `escaped_path` was skipped on the last run.
    #[must_use]
    pub fn skipped(&self, escaped_path: &str) -> bool {
        self.entries
            .get(escaped_path)
            .is_some_and(|status| status.skipped)
    }

    /// Replace the records wholesale with the outcomes of this run.
    pub fn rewrite<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, EntryStatus)>,
    {
        self.entries = entries.into_iter().collect();
    }

    /// Write the records back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self) -> anyhow::Result<()> {
        use anyhow::Context as _;
        let file = StatusFile {
            version: STATUS_FORMAT_VERSION,
            entries: self.entries.clone(),
        };
        let text = toml::to_string(&file).context("serializing status records")?;
        fsutil::ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing status file {}", self.path.display()))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::load(dir.path().join("status.toml")).unwrap();
        assert!(!store.skipped("_foo"));
    }

    #[test]
    fn records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.toml");

        let mut store = StatusStore::load(path.clone()).unwrap();
        store.rewrite([
            ("_foo".to_string(), EntryStatus { skipped: true }),
            ("_bar/baz".to_string(), EntryStatus { skipped: false }),
        ]);
        store.write().unwrap();

        let reloaded = StatusStore::load(path).unwrap();
        assert!(reloaded.skipped("_foo"));
        assert!(!reloaded.skipped("_bar/baz"));
        assert!(!reloaded.skipped("never_recorded"));
    }

    #[test]
    fn rewrite_drops_stale_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.toml");

        let mut store = StatusStore::load(path.clone()).unwrap();
        store.rewrite([("_old".to_string(), EntryStatus { skipped: true })]);
        store.write().unwrap();

        let mut store = StatusStore::load(path.clone()).unwrap();
        store.rewrite([("_new".to_string(), EntryStatus { skipped: true })]);
        store.write().unwrap();

        let reloaded = StatusStore::load(path).unwrap();
        assert!(!reloaded.skipped("_old"));
        assert!(reloaded.skipped("_new"));
    }

    #[test]
    fn corrupt_file_is_a_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.toml");
        std::fs::write(&path, "version = \"not an integer\"").unwrap();
        let err = StatusStore::load(path).unwrap_err();
        assert!(matches!(err, StatusError::Corrupt { .. }), "got {err}");
    }

    #[test]
    fn newer_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.toml");
        std::fs::write(&path, "version = 99\n").unwrap();
        let err = StatusStore::load(path).unwrap_err();
        assert!(
            matches!(err, StatusError::VersionTooNew { found: 99, .. }),
            "got {err}"
        );
    }

    #[test]
    fn missing_skipped_field_defaults_to_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.toml");
        std::fs::write(&path, "version = 1\n\n[entries._foo]\n").unwrap();
        let store = StatusStore::load(path).unwrap();
        assert!(!store.skipped("_foo"));
    }
}
