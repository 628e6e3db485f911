//! Per-entry outcomes reported by the reconciliation operations.
//!
//! The state machine in [`crate::entry`] returns these instead of printing;
//! the orchestration layer decides how they are displayed. Refusals (a
//! blocked target, an occupied backup slot, a tampered installation) are
//! ordinary values with `success() == false`, not errors — one entry's
//! refusal never stops the rest of the tree from being processed.

/// What a build operation did for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The output was already up to date.
    Current,
    /// The entry was (re)rendered.
    Built,
    /// The renderer opted out; the entry has no artifacts.
    Skipped,
    /// The output carries user edits and `--overwrite` was not given.
    Modified,
    /// The pristine copy is missing, so edits cannot be detected; nothing
    /// was rebuilt without `--overwrite`.
    OrgMissing,
}

impl BuildOutcome {
    /// Fixed label for report output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Built => "Building",
            Self::Skipped => "Skipped",
            Self::Modified => "Modified",
            Self::OrgMissing => "Org missing",
        }
    }
}

/// What an install operation did for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The target was created.
    Created,
    /// The target was already installed.
    AlreadyInstalled,
    /// An existing target was backed up and replaced.
    Overwritten,
    /// Something occupies the target and `--overwrite` was not given.
    Exists,
    /// The target is occupied by something installation may not replace.
    Blocked,
    /// The backup slot is already occupied from an earlier run.
    BackupExists,
    /// The entry is skipped; there is nothing to install.
    Skipped,
}

impl InstallOutcome {
    /// Whether the entry ended installed or intentionally left alone
    /// without error.
    #[must_use]
    pub const fn success(self) -> bool {
        !matches!(self, Self::Exists | Self::Blocked | Self::BackupExists)
    }

    /// Fixed label for report output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Creating",
            Self::AlreadyInstalled => "Current",
            Self::Overwritten => "Overwrite",
            Self::Exists => "Exists",
            Self::Blocked => "Blocked",
            Self::BackupExists => "Backup exists",
            Self::Skipped => "Skipped",
        }
    }
}

/// What an uninstall operation did for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// The installed target was removed; nothing had been displaced.
    Removed,
    /// The installed target was removed and the backup moved back.
    Restored,
    /// Nothing was installed; nothing to do.
    NotInstalled,
    /// An installed directory still holds content and was left in place.
    Kept,
    /// A backup exists but the target no longer matches the installed
    /// shape — somebody changed it behind our back.
    Tampered,
}

impl UninstallOutcome {
    /// Whether the entry ended uninstalled (or legitimately untouched).
    #[must_use]
    pub const fn success(self) -> bool {
        !matches!(self, Self::Tampered)
    }

    /// Fixed label for report output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Removed => "Removing",
            Self::Restored => "Restoring",
            Self::NotInstalled => "Not installed",
            Self::Kept => "Kept",
            Self::Tampered => "Tampered",
        }
    }
}
