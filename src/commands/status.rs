use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::repository::StatusRow;

/// Run the `status` command.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or inspected.
pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut repo = super::open_repository(global)?;
    let result = repo.status_rows();
    repo.write_status()?;
    print!("{}", format_table(&result?));
    Ok(())
}

/// Render status rows as a fixed-width table.
#[must_use]
pub fn format_table(rows: &[StatusRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{:<5} {:<12} {:<10} {}\n",
                row.kind,
                row.build,
                row.target,
                row.path.display()
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn table_columns_are_aligned() {
        let rows = vec![
            StatusRow {
                kind: "dir",
                build: "current",
                target: "installed",
                path: PathBuf::from(".config"),
            },
            StatusRow {
                kind: "file",
                build: "modified",
                target: "present",
                path: PathBuf::from(".bashrc"),
            },
        ];
        insta::assert_snapshot!(format_table(&rows), @r"
        dir   current      installed  .config
        file  modified     present    .bashrc
        ");
    }

    #[test]
    fn empty_table_is_empty() {
        assert_eq!(format_table(&[]), "");
    }
}
