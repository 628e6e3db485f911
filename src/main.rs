//! The `coffle` binary.

use anyhow::Result;
use clap::Parser as _;

use coffle::cli::{Cli, Command};
use coffle::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init(args.verbose);

    match args.command {
        Command::Init => commands::init::run(&args.global),
        Command::Build(opts) => commands::build::run(&args.global, &opts),
        Command::Install(opts) => commands::install::run(&args.global, &opts),
        Command::Uninstall => commands::uninstall::run(&args.global),
        Command::Status => commands::status::run(&args.global),
        Command::Diff => commands::diff::run(&args.global),
        Command::Info => commands::info::run(&args.global),
    }
}
