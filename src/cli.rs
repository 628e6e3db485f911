use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "coffle",
    about = "Template-driven dotfile installation with safe backups",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Source directory holding the templates (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Target directory entries are installed into (defaults to the home directory)
    #[arg(short, long, global = true)]
    pub target: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialise the source directory
    Init,
    /// Render templates into build artifacts
    Build(BuildOpts),
    /// Install entries into the target directory
    Install(InstallOpts),
    /// Remove installed entries, restoring backups
    Uninstall,
    /// Show the build and install state of every entry
    Status,
    /// Show differences between pristine and edited build artifacts
    Diff,
    /// Show the resolved repository layout
    Info,
}

/// Options for the `build` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct BuildOpts {
    /// Rebuild even if the built file is current
    #[arg(short, long)]
    pub rebuild: bool,

    /// Discard edits made to built files
    #[arg(short, long)]
    pub overwrite: bool,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Back up and replace existing files (a backup will be created)
    #[arg(short, long)]
    pub overwrite: bool,
}
