use anyhow::Result;

use crate::cli::GlobalOpts;

/// Run the `info` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    let description = repo.describe();
    repo.write_status()?;
    print!("{description}");
    Ok(())
}
