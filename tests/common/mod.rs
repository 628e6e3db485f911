//! Shared fixture for integration tests: an initialised source tree and a
//! target directory inside one temp dir.

use std::path::{Path, PathBuf};

use coffle::repository::Repository;

#[derive(Debug)]
pub struct TestRepo {
    _dir: tempfile::TempDir,
    pub source: PathBuf,
    pub target: PathBuf,
}

#[allow(clippy::expect_used, clippy::unwrap_used, dead_code)]
impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::create_dir_all(&source).unwrap();
        Repository::init(&source).expect("initialise source");
        Self {
            _dir: dir,
            source,
            target,
        }
    }

    /// Write a template file under the source tree, creating parents.
    pub fn template(&self, path: &str, contents: &str) {
        let file = self.source.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, contents).unwrap();
    }

    /// Create a directory entry under the source tree.
    pub fn template_dir(&self, path: &str) {
        std::fs::create_dir_all(self.source.join(path)).unwrap();
    }

    pub fn open(&self) -> Repository {
        Repository::open(&self.source, &self.target).expect("open repository")
    }

    pub fn target_path(&self, path: &str) -> PathBuf {
        self.target.join(path)
    }

    pub fn backup_path(&self, path: &str) -> PathBuf {
        self.source.join(".coffle/backup").join(path)
    }

    pub fn output_path(&self, path: &str) -> PathBuf {
        self.source.join(".coffle/output").join(path)
    }
}

/// Whether anything (including a dangling symlink) occupies `path`.
#[allow(dead_code)]
pub fn present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` is a symlink.
#[allow(dead_code)]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_symlink())
}
