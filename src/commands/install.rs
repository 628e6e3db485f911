use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};

/// Run the `install` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened, the filesystem
/// fails, or any entry ends in a refusal.
pub fn run(global: &GlobalOpts, opts: &InstallOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    tracing::debug!(
        "installing to {} ({})",
        repo.layout().target_root.display(),
        if opts.overwrite {
            "overwriting"
        } else {
            "non-overwriting"
        }
    );
    let result = repo.install(opts.overwrite);
    super::finish(&mut repo, result)
}
