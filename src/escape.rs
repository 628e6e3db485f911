//! Mapping between source-tree names and target-tree names.
//!
//! Entries that should be installed as dotfiles are stored without the
//! leading dot: `_bashrc` in the source tree becomes `.bashrc` in the
//! target tree. A leading `-` is the escape hatch for names that must
//! literally begin with `_` or `-` (or `.`, which the scanner would
//! otherwise never yield): `-_data` installs as `_data`.
//!
//! The mapping is applied per path segment and is lossless for every name
//! the scanner can produce: `escape_segment(unescape_segment(s)) == s`.

use std::path::{Path, PathBuf};

/// Translate one source-tree name into its target-tree name.
#[must_use]
pub fn unescape_segment(segment: &str) -> String {
    if let Some(rest) = segment.strip_prefix('-') {
        rest.to_string()
    } else if let Some(rest) = segment.strip_prefix('_') {
        format!(".{rest}")
    } else {
        segment.to_string()
    }
}

/// Translate one target-tree name into its source-tree name.
///
/// Inverse of [`unescape_segment`]: names beginning with `.` lose the dot
/// and gain a `_`; names beginning with `_` or `-` gain a protective `-`.
#[must_use]
pub fn escape_segment(segment: &str) -> String {
    if let Some(rest) = segment.strip_prefix('.') {
        format!("_{rest}")
    } else if segment.starts_with('_') || segment.starts_with('-') {
        format!("-{segment}")
    } else {
        segment.to_string()
    }
}

/// Apply [`unescape_segment`] to every component of a relative path.
#[must_use]
pub fn unescape_path(path: &Path) -> PathBuf {
    map_segments(path, unescape_segment)
}

/// Apply [`escape_segment`] to every component of a relative path.
#[must_use]
pub fn escape_path(path: &Path) -> PathBuf {
    map_segments(path, escape_segment)
}

fn map_segments(path: &Path, f: impl Fn(&str) -> String) -> PathBuf {
    path.iter()
        .map(|component| f(&component.to_string_lossy()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn underscore_becomes_dot() {
        assert_eq!(unescape_segment("_bashrc"), ".bashrc");
    }

    #[test]
    fn dash_is_stripped() {
        assert_eq!(unescape_segment("-_data"), "_data");
        assert_eq!(unescape_segment("--dashed"), "-dashed");
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(unescape_segment("bin"), "bin");
        assert_eq!(escape_segment("bin"), "bin");
    }

    #[test]
    fn escape_inverts_unescape() {
        for segment in ["_foo", "-_foo", "--x", "plain", "_", "a_b", "a-b"] {
            assert_eq!(
                escape_segment(&unescape_segment(segment)),
                segment,
                "round trip failed for {segment}"
            );
        }
    }

    #[test]
    fn dotfile_escapes_to_underscore() {
        assert_eq!(escape_segment(".bashrc"), "_bashrc");
    }

    #[test]
    fn path_segments_map_independently() {
        assert_eq!(
            unescape_path(Path::new("_config/nvim/_init.vim")),
            PathBuf::from(".config/nvim/.init.vim")
        );
        assert_eq!(
            escape_path(Path::new(".config/nvim/.init.vim")),
            PathBuf::from("_config/nvim/_init.vim")
        );
    }

    #[test]
    fn path_round_trip() {
        let source = Path::new("_bar/-_baz/plain");
        assert_eq!(escape_path(&unescape_path(source)), source);
    }
}
