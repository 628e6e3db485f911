//! The per-path reconciliation state machine.
//!
//! An [`Entry`] is one relative path under the source tree together with
//! every location derived from it: the template (`source`), the rendered
//! artifact (`output`), the pristine copy taken at build time (`org`), the
//! externally visible location (`target`) and the slot a displaced
//! pre-existing target is moved to (`backup`). The entry decides, on each
//! query, whether it needs building, whether it is installed, and how to
//! transition safely — nothing is cached across mutating operations.
//!
//! Refusals (blocked target, occupied backup slot, tampered installation)
//! are returned as [`outcome`](crate::outcome) values; `Err` is reserved
//! for I/O failures and internal invariant violations.

use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};

use crate::escape;
use crate::fsutil;
use crate::outcome::{BuildOutcome, InstallOutcome, UninstallOutcome};
use crate::render::{Render, Rendered};

/// Absolute directory layout entries derive their locations from.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Root of the template tree.
    pub source_root: PathBuf,
    /// Root of the rendered artifacts.
    pub output_root: PathBuf,
    /// Root of the pristine copies.
    pub org_root: PathBuf,
    /// Root of the displaced-target backups.
    pub backup_root: PathBuf,
    /// Root the entries are installed under.
    pub target_root: PathBuf,
}

/// Whether an entry is a leaf to render or a container.
///
/// A source path counts as a directory only when it is a proper directory;
/// symlinks in the source tree are file-like leaves and never traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A template rendered to a file and installed as a symlink.
    File,
    /// A container installed as a real directory.
    Directory,
}

impl EntryKind {
    /// Short label for the status table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
        }
    }
}

/// Build state, derived from the filesystem each time it is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// The most recent render opted out; there are no artifacts.
    Skipped,
    /// The output does not exist.
    NotBuilt,
    /// The output exists but the pristine copy is gone — a prior partial
    /// failure; user edits cannot be detected.
    OrgMissing,
    /// The output no longer matches the pristine copy.
    Modified,
    /// The source changed after the output was rendered.
    Outdated,
    /// Built and up to date.
    Current,
}

impl BuildState {
    /// Label for the status table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::NotBuilt => "not built",
            Self::OrgMissing => "org missing",
            Self::Modified => "modified",
            Self::Outdated => "outdated",
            Self::Current => "current",
        }
    }
}

/// One path under the source tree and its reconciliation state machine.
#[derive(Debug)]
pub struct Entry {
    path: PathBuf,
    kind: EntryKind,
    source: PathBuf,
    output: PathBuf,
    org: PathBuf,
    target: PathBuf,
    backup: PathBuf,
    link_target: PathBuf,
    skipped: bool,
}

impl Entry {
    /// Derive an entry's locations from its relative (escaped) path.
    #[must_use]
    pub fn new(layout: &Layout, path: PathBuf, kind: EntryKind, skipped: bool) -> Self {
        let source = layout.source_root.join(&path);
        let output = layout.output_root.join(&path);
        let org = layout.org_root.join(&path);
        let unescaped = escape::unescape_path(&path);
        let target = layout.target_root.join(&unescaped);
        let backup = layout.backup_root.join(&unescaped);
        let link_target = fsutil::relative_path_from(
            &output,
            target.parent().unwrap_or(&layout.target_root),
        );
        Self {
            path,
            kind,
            source,
            output,
            org,
            target,
            backup,
            link_target,
            skipped,
        }
    }

    /// The relative (escaped) path; the entry's identity across runs.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The unescaped path, as displayed to the user.
    #[must_use]
    pub fn display_path(&self) -> PathBuf {
        escape::unescape_path(&self.path)
    }

    /// File or directory.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Whether the most recent build was skipped by the renderer.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        self.skipped
    }

    /// The template location.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The rendered artifact location.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The pristine-copy location.
    #[must_use]
    pub fn org(&self) -> &Path {
        &self.org
    }

    /// The installed location.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The backup slot for a displaced pre-existing target.
    #[must_use]
    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// The exact text an installed symlink must contain.
    #[must_use]
    pub fn link_target(&self) -> &Path {
        &self.link_target
    }

    // -- build state ---------------------------------------------------

    /// Whether output and org both exist with the right type.
    #[must_use]
    pub fn built(&self) -> bool {
        match self.kind {
            EntryKind::File => {
                fsutil::proper_file(&self.output) && fsutil::proper_file(&self.org)
            }
            EntryKind::Directory => {
                fsutil::proper_directory(&self.output)
                    && fsutil::proper_directory(&self.org)
            }
        }
    }

    /// Whether the entry needs re-rendering. Unbuilt entries are outdated;
    /// directories, once they exist, never are.
    ///
    /// # Errors
    ///
    /// Returns an error if modification times cannot be read.
    pub fn outdated(&self) -> Result<bool> {
        if !self.built() {
            return Ok(true);
        }
        match self.kind {
            EntryKind::Directory => Ok(false),
            EntryKind::File => Ok(fsutil::modification_time(&self.output)?
                < fsutil::modification_time(&self.source)?),
        }
    }

    /// Whether the output carries edits made after it was rendered.
    /// Directories are never modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact contents cannot be read.
    pub fn modified(&self) -> Result<bool> {
        if !self.built() {
            return Ok(false);
        }
        match self.kind {
            EntryKind::Directory => Ok(false),
            EntryKind::File => Ok(!fsutil::file_identical(&self.output, &self.org)?),
        }
    }

    /// Classify the build state for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be inspected.
    pub fn build_state(&self) -> Result<BuildState> {
        if !fsutil::present(&self.output) {
            return Ok(if self.skipped {
                BuildState::Skipped
            } else {
                BuildState::NotBuilt
            });
        }
        if !fsutil::present(&self.org) {
            return Ok(BuildState::OrgMissing);
        }
        if self.modified()? {
            Ok(BuildState::Modified)
        } else if self.outdated()? {
            Ok(BuildState::Outdated)
        } else {
            Ok(BuildState::Current)
        }
    }

    // -- target state --------------------------------------------------

    /// Whether the target is in the installed shape: a directory (plain or
    /// via symlink) for directory entries; for file entries a symlink
    /// whose literal text equals [`link_target`](Self::link_target) — the
    /// comparison is textual, not resolved.
    #[must_use]
    pub fn installed(&self) -> bool {
        match self.kind {
            EntryKind::Directory => fsutil::is_directory(&self.target),
            EntryKind::File => std::fs::read_link(&self.target)
                .is_ok_and(|text| text == self.link_target),
        }
    }

    /// Whether the target is occupied by something installation may not
    /// safely replace: a proper directory for file entries; anything that
    /// does not resolve to a directory for directory entries.
    #[must_use]
    pub fn blocked(&self) -> bool {
        match self.kind {
            EntryKind::File => fsutil::proper_directory(&self.target),
            EntryKind::Directory => {
                fsutil::present(&self.target) && !fsutil::is_directory(&self.target)
            }
        }
    }

    /// Label for the status table's target column.
    #[must_use]
    pub fn target_label(&self) -> &'static str {
        if self.installed() {
            "installed"
        } else if self.blocked() {
            "blocked"
        } else if fsutil::present(&self.target) {
            "present"
        } else {
            "missing"
        }
    }

    // -- operations ----------------------------------------------------

    /// Bring the output up to date.
    ///
    /// Modified outputs are preserved unless `overwrite` is given; an
    /// entry whose pristine copy is missing is treated the same way, since
    /// edits cannot be detected. `rebuild` forces a re-render of current
    /// entries. A renderer skip removes any stale artifacts and uninstalls
    /// the entry, restoring its backup if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the source vanished mid-run, rendering fails,
    /// or artifacts cannot be written.
    pub fn build(
        &mut self,
        rebuild: bool,
        overwrite: bool,
        renderer: &dyn Render,
    ) -> Result<BuildOutcome> {
        if !fsutil::present(&self.source) {
            bail!("source vanished mid-run: {}", self.source.display());
        }

        if self.modified()? {
            if !overwrite {
                return Ok(BuildOutcome::Modified);
            }
            return self.render(renderer);
        }
        if fsutil::present(&self.output) && !fsutil::present(&self.org) {
            if !overwrite {
                return Ok(BuildOutcome::OrgMissing);
            }
            return self.render(renderer);
        }
        if rebuild || self.outdated()? {
            return self.render(renderer);
        }
        Ok(BuildOutcome::Current)
    }

    /// Unconditionally re-render the entry.
    fn render(&mut self, renderer: &dyn Render) -> Result<BuildOutcome> {
        match self.kind {
            EntryKind::Directory => {
                fsutil::ensure_dir(&self.output)?;
                fsutil::ensure_dir(&self.org)?;
                self.skipped = false;
                Ok(BuildOutcome::Built)
            }
            EntryKind::File => {
                fsutil::ensure_parent_dir(&self.output)?;
                fsutil::ensure_parent_dir(&self.org)?;
                match renderer.render(&self.source, &self.output)? {
                    Rendered::Written => {
                        std::fs::copy(&self.output, &self.org).with_context(|| {
                            format!(
                                "copying {} to {}",
                                self.output.display(),
                                self.org.display()
                            )
                        })?;
                        self.skipped = false;
                        Ok(BuildOutcome::Built)
                    }
                    Rendered::Skipped => {
                        self.skipped = true;
                        self.remove_artifacts()?;
                        // Becoming skipped means "should not be installed":
                        // take the target down and restore any backup. A
                        // refusal (tampered target) is left for the user.
                        self.uninstall()?;
                        Ok(BuildOutcome::Skipped)
                    }
                }
            }
        }
    }

    /// Remove stale output/org artifacts after a skip.
    fn remove_artifacts(&self) -> Result<()> {
        for path in [&self.output, &self.org] {
            if fsutil::present(path) {
                std::fs::remove_file(path)
                    .with_context(|| format!("removing {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Install the entry, building it first if necessary.
    ///
    /// Returns whether the entry ended installed or intentionally left
    /// alone; refusals are outcomes, not errors. The pre-install build
    /// never discards a modified output — that requires an explicit
    /// `build --overwrite`.
    ///
    /// # Errors
    ///
    /// Returns an error if building fails or the filesystem cannot be
    /// mutated.
    pub fn install(
        &mut self,
        overwrite: bool,
        renderer: &dyn Render,
    ) -> Result<InstallOutcome> {
        if !self.built() || self.outdated()? {
            self.build(false, false, renderer)?;
        }
        if self.skipped {
            return Ok(InstallOutcome::Skipped);
        }
        if self.installed() {
            return Ok(InstallOutcome::AlreadyInstalled);
        }
        if fsutil::present(&self.backup) {
            // An occupied backup slot means an earlier operation was
            // interrupted (or the target was tampered with afterwards).
            // Proceeding would destroy information; never auto-resolved.
            return Ok(InstallOutcome::BackupExists);
        }
        if self.blocked() {
            return Ok(InstallOutcome::Blocked);
        }
        if fsutil::present(&self.target) {
            if !overwrite {
                return Ok(InstallOutcome::Exists);
            }
            self.displace_target()?;
            self.create_target()?;
            Ok(InstallOutcome::Overwritten)
        } else {
            self.create_target()?;
            Ok(InstallOutcome::Created)
        }
    }

    /// Create the target, which must not exist.
    fn create_target(&self) -> Result<()> {
        if fsutil::present(&self.target) {
            bail!("target exists: {}", self.target.display());
        }
        match self.kind {
            EntryKind::Directory => fsutil::ensure_dir(&self.target),
            EntryKind::File => {
                fsutil::ensure_parent_dir(&self.target)?;
                fsutil::make_symlink(&self.link_target, &self.target)
            }
        }
    }

    /// Move the target out of the way into the backup slot.
    ///
    /// When the target is a directory and a backup directory already
    /// exists at the slot (a file inside was backed up before the
    /// directory itself), the directory's entries are moved over
    /// individually and the emptied directory removed.
    fn displace_target(&self) -> Result<()> {
        fsutil::ensure_parent_dir(&self.backup)?;
        if fsutil::is_directory(&self.target) && fsutil::is_directory(&self.backup) {
            let listing = std::fs::read_dir(&self.target)
                .with_context(|| format!("reading {}", self.target.display()))?;
            for dir_entry in listing {
                let dir_entry = dir_entry
                    .with_context(|| format!("reading {}", self.target.display()))?;
                let destination = self.backup.join(dir_entry.file_name());
                std::fs::rename(dir_entry.path(), &destination).with_context(|| {
                    format!(
                        "moving {} to {}",
                        dir_entry.path().display(),
                        destination.display()
                    )
                })?;
            }
            std::fs::remove_dir(&self.target)
                .with_context(|| format!("removing {}", self.target.display()))?;
        } else {
            std::fs::rename(&self.target, &self.backup).with_context(|| {
                format!(
                    "moving {} to {}",
                    self.target.display(),
                    self.backup.display()
                )
            })?;
        }
        Ok(())
    }

    /// Take the entry's target down, restoring whatever it displaced.
    ///
    /// Idempotent: repeating it on an uninstalled entry succeeds. A backup
    /// alongside a target that no longer matches the installed shape is a
    /// refusal — somebody changed the installation behind our back, and
    /// neither the backup nor the replacement may be discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be mutated.
    pub fn uninstall(&mut self) -> Result<UninstallOutcome> {
        let backup_present = fsutil::present(&self.backup);
        if !self.installed() {
            if backup_present {
                return Ok(UninstallOutcome::Tampered);
            }
            return Ok(UninstallOutcome::NotInstalled);
        }
        match self.kind {
            EntryKind::File => {
                std::fs::remove_file(&self.target)
                    .with_context(|| format!("removing {}", self.target.display()))?;
                self.restore_backup(backup_present)
            }
            EntryKind::Directory => self.uninstall_directory(backup_present),
        }
    }

    fn restore_backup(&self, backup_present: bool) -> Result<UninstallOutcome> {
        if backup_present {
            std::fs::rename(&self.backup, &self.target).with_context(|| {
                format!(
                    "restoring {} to {}",
                    self.backup.display(),
                    self.target.display()
                )
            })?;
            Ok(UninstallOutcome::Restored)
        } else {
            Ok(UninstallOutcome::Removed)
        }
    }

    /// Uninstall a directory entry whose target is in the installed shape.
    ///
    /// Only an empty directory is removed; one that still holds content
    /// (the user's, or just-restored nested backups) is kept. A leftover
    /// backup directory is cleaned up when empty and refused otherwise.
    fn uninstall_directory(&self, backup_present: bool) -> Result<UninstallOutcome> {
        if !fsutil::proper_directory(&self.target) {
            // Installed via a symlink to a directory: unlink the symlink.
            std::fs::remove_file(&self.target)
                .with_context(|| format!("removing {}", self.target.display()))?;
            return self.restore_backup(backup_present);
        }
        let empty = std::fs::read_dir(&self.target)
            .with_context(|| format!("reading {}", self.target.display()))?
            .next()
            .is_none();
        if empty {
            std::fs::remove_dir(&self.target)
                .with_context(|| format!("removing {}", self.target.display()))?;
            return self.restore_backup(backup_present);
        }
        if backup_present {
            let backup_empty = fsutil::proper_directory(&self.backup)
                && std::fs::read_dir(&self.backup)
                    .with_context(|| format!("reading {}", self.backup.display()))?
                    .next()
                    .is_none();
            if !backup_empty {
                return Ok(UninstallOutcome::Tampered);
            }
            std::fs::remove_dir(&self.backup)
                .with_context(|| format!("removing {}", self.backup.display()))?;
        }
        Ok(UninstallOutcome::Kept)
    }
}
