use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::repository::Repository;

/// Run the `init` command.
///
/// # Errors
///
/// Returns an error if the marker file cannot be written.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let source = super::resolve_source(global)?;
    if Repository::init(&source)? {
        println!("Initialised {} as a coffle source directory", source.display());
    } else {
        println!("{} is already a coffle source directory", source.display());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::SOURCE_MARKER;
    use std::path::PathBuf;

    #[test]
    fn init_writes_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("dots");
        let global = GlobalOpts {
            source: Some(source.clone()),
            target: None,
        };
        run(&global).unwrap();
        let marker = std::fs::read_to_string(source.join(SOURCE_MARKER)).unwrap();
        assert_eq!(marker, "version = 1\n");
    }

    #[test]
    fn init_twice_leaves_the_marker_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source: PathBuf = dir.path().join("dots");
        let global = GlobalOpts {
            source: Some(source.clone()),
            target: None,
        };
        run(&global).unwrap();
        std::fs::write(source.join(SOURCE_MARKER), "version = 1\n# custom\n").unwrap();
        run(&global).unwrap();
        let marker = std::fs::read_to_string(source.join(SOURCE_MARKER)).unwrap();
        assert!(marker.contains("# custom"), "marker must not be rewritten");
    }
}
