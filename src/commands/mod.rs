//! Top-level subcommand orchestration.
//!
//! Each dispatching command constructs one [`Repository`], runs one
//! operation, and persists the status records afterwards — even when the
//! operation itself returned a handled domain error.

pub mod build;
pub mod diff;
pub mod info;
pub mod init;
pub mod install;
pub mod status;
pub mod uninstall;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::repository::{Repository, RunReport};

/// Resolve the source directory from CLI arguments or the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_source(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.source {
        Some(source) => Ok(source.clone()),
        None => std::env::current_dir().context("cannot determine the current directory"),
    }
}

/// Resolve the target directory from CLI arguments or the home directory.
///
/// # Errors
///
/// Returns an error if no home directory can be determined.
pub fn resolve_target(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.target {
        Some(target) => Ok(target.clone()),
        None => dirs::home_dir()
            .context("cannot determine the home directory; use --target"),
    }
}

/// Construct the repository for the resolved source/target pair.
///
/// # Errors
///
/// Propagates source validation and status loading errors.
pub fn open_repository(global: &GlobalOpts) -> Result<Repository> {
    let source = resolve_source(global)?;
    let target = resolve_target(global)?;
    Repository::open(&source, &target)
}

/// Persist status, print the report, and fail on aggregated refusals.
///
/// The status write happens before the operation result is inspected so
/// that a handled domain error never loses the run's outcomes.
fn finish(repo: &mut Repository, result: Result<RunReport>) -> Result<()> {
    repo.write_status()?;
    let report = result?;
    for line in &report.lines {
        if line.detail.is_empty() {
            println!("{:<14}{}", line.label, line.path.display());
        } else {
            println!("{:<14}{} {}", line.label, line.path.display(), line.detail);
        }
    }
    if report.failures > 0 {
        let noun = if report.failures == 1 { "entry" } else { "entries" };
        anyhow::bail!("{} {noun} could not be processed", report.failures);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolve_source_uses_explicit_path() {
        let global = GlobalOpts {
            source: Some(PathBuf::from("/explicit/source")),
            target: None,
        };
        assert_eq!(
            resolve_source(&global).unwrap(),
            PathBuf::from("/explicit/source")
        );
    }

    #[test]
    fn resolve_source_defaults_to_current_dir() {
        let global = GlobalOpts {
            source: None,
            target: None,
        };
        assert_eq!(
            resolve_source(&global).unwrap(),
            std::env::current_dir().unwrap()
        );
    }

    #[test]
    fn resolve_target_uses_explicit_path() {
        let global = GlobalOpts {
            source: None,
            target: Some(PathBuf::from("/explicit/target")),
        };
        assert_eq!(
            resolve_target(&global).unwrap(),
            PathBuf::from("/explicit/target")
        );
    }
}
