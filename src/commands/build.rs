use anyhow::Result;

use crate::cli::{BuildOpts, GlobalOpts};

/// Run the `build` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or rendering fails.
pub fn run(global: &GlobalOpts, opts: &BuildOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    tracing::debug!(
        "building in {} (rebuild: {}, overwrite: {})",
        repo.layout().output_root.display(),
        opts.rebuild,
        opts.overwrite
    );
    let result = repo.build(opts.rebuild, opts.overwrite);
    super::finish(&mut repo, result)
}
