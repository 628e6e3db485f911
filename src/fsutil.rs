//! Filesystem predicates and helpers shared by the reconciliation engine.
//!
//! Symlink handling is the whole point of these helpers: `present` sees
//! dangling symlinks, the `proper_*` predicates refuse symlinks, and
//! [`is_directory`] follows them. All of them take a plain `&Path`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Whether anything occupies `path`: a file, a directory, or a symlink —
/// including a symlink whose destination is missing.
#[must_use]
pub fn present(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` is a regular file and not a symlink.
#[must_use]
pub fn proper_file(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_file())
}

/// Whether `path` is a directory and not a symlink.
#[must_use]
pub fn proper_directory(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}

/// Whether `path` resolves to a directory — a proper directory or a
/// symlink pointing at one.
#[must_use]
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Whether two paths are regular files with identical contents.
///
/// Returns `false` when either path is missing or not a file.
///
/// # Errors
///
/// Returns an error if either file exists but cannot be read.
pub fn file_identical(a: &Path, b: &Path) -> Result<bool> {
    if !a.is_file() || !b.is_file() {
        return Ok(false);
    }
    let contents_a =
        std::fs::read(a).with_context(|| format!("reading {}", a.display()))?;
    let contents_b =
        std::fs::read(b).with_context(|| format!("reading {}", b.display()))?;
    Ok(contents_a == contents_b)
}

/// Modification time of `path`.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read.
pub fn modification_time(path: &Path) -> Result<SystemTime> {
    path.metadata()
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime: {}", path.display()))
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Ensure `path` exists as a directory (`mkdir -p` semantics).
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("create directory: {}", path.display()))
}

/// Create a symlink at `link` whose literal text is `link_text`.
///
/// # Errors
///
/// Returns an error if the symlink cannot be created.
pub fn make_symlink(link_text: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let made = std::os::unix::fs::symlink(link_text, link);
    #[cfg(windows)]
    let made = std::os::windows::fs::symlink_file(link_text, link);
    made.with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            link_text.display()
        )
    })
}

/// The relative path that reaches `path` from `base`.
///
/// Both paths must be absolute. The result is the string a symlink placed
/// in `base` must contain to point at `path`: shared leading components
/// are dropped, each remaining `base` component contributes a `..`.
#[must_use]
pub fn relative_path_from(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component);
    }
    relative
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn present_sees_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        assert!(!present(&file));
        std::fs::write(&file, "x").unwrap();
        assert!(present(&file));
        assert!(present(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn present_sees_dangling_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("missing", &link).unwrap();
        assert!(present(&link));
        assert!(!link.exists(), "exists() follows the dangling link");
    }

    #[cfg(unix)]
    #[test]
    fn proper_predicates_reject_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        let subdir = dir.path().join("sub");
        std::fs::write(&file, "x").unwrap();
        std::fs::create_dir(&subdir).unwrap();

        let file_link = dir.path().join("file_link");
        let dir_link = dir.path().join("dir_link");
        std::os::unix::fs::symlink(&file, &file_link).unwrap();
        std::os::unix::fs::symlink(&subdir, &dir_link).unwrap();

        assert!(proper_file(&file));
        assert!(!proper_file(&file_link));
        assert!(proper_directory(&subdir));
        assert!(!proper_directory(&dir_link));
        // is_directory follows the link
        assert!(is_directory(&dir_link));
        assert!(!is_directory(&file_link));
    }

    #[test]
    fn file_identical_compares_contents() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        assert!(file_identical(&a, &b).unwrap());

        std::fs::write(&b, "different").unwrap();
        assert!(!file_identical(&a, &b).unwrap());
    }

    #[test]
    fn file_identical_false_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        std::fs::write(&a, "x").unwrap();
        assert!(!file_identical(&a, &dir.path().join("missing")).unwrap());
    }

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn relative_path_for_sibling() {
        assert_eq!(
            relative_path_from(Path::new("/s/.coffle/output/_foo"), Path::new("/t")),
            PathBuf::from("../s/.coffle/output/_foo")
        );
    }

    #[test]
    fn relative_path_for_nested_base() {
        assert_eq!(
            relative_path_from(
                Path::new("/s/.coffle/output/_bar/baz"),
                Path::new("/t/.bar")
            ),
            PathBuf::from("../../s/.coffle/output/_bar/baz")
        );
    }

    #[test]
    fn relative_path_within_same_tree() {
        assert_eq!(
            relative_path_from(Path::new("/a/b/c"), Path::new("/a/b")),
            PathBuf::from("c")
        );
    }
}
