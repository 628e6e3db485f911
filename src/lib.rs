//! Template-driven dotfile installation with safe backups.
//!
//! A source tree holds configuration templates (`_bashrc`, `_config/…`);
//! `coffle` renders them into build artifacts and exposes them in a target
//! directory — typically the home directory — as a reconciled symlink
//! farm. Anything displaced in the process is backed up and restored on
//! uninstall, and every operation is idempotent across repeated runs.
//!
//! The crate is organised around a small number of layers:
//!
//! - **[`escape`]** — source-name ⇄ target-name mapping (`_x` ⇄ `.x`)
//! - **[`render`]** — template expansion with a skip directive
//! - **[`entry`]** — the per-path build/install/uninstall state machine
//! - **[`repository`]** — layout, source validation, scanning and
//!   orchestration across the whole tree
//! - **[`status`]** — cross-run status records
//! - **[`commands`]** — top-level subcommand handlers
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod entry;
pub mod error;
pub mod escape;
pub mod exec;
pub mod fsutil;
pub mod logging;
pub mod outcome;
pub mod render;
pub mod repository;
pub mod status;
