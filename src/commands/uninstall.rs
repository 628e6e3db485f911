use anyhow::Result;

use crate::cli::GlobalOpts;

/// Run the `uninstall` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened, the filesystem
/// fails, or a tampered target is refused.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    let result = repo.uninstall();
    super::finish(&mut repo, result)
}
