use anyhow::Result;

use crate::cli::GlobalOpts;

/// Run the `diff` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or artifact
/// contents cannot be read.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    let result = repo.diff();
    repo.write_status()?;
    print!("{}", result?);
    Ok(())
}
