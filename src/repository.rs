//! The repository: directory layout, source validation, tree scanning and
//! orchestration of the per-entry operations.
//!
//! A repository is constructed fresh per invocation. Construction resolves
//! the roots (symlinks followed, exactly once), validates the source
//! marker, creates the target and work directories when absent and loads
//! the persisted status records; the instance is discarded after the run
//! has written its status back out. Two repositories operating on the same
//! source tree concurrently are not supported.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::entry::{Entry, EntryKind, Layout};
use crate::error::SourceError;
use crate::fsutil;
use crate::outcome::InstallOutcome;
use crate::render::TemplateRenderer;
use crate::status::{EntryStatus, StatusStore};

/// Name of the marker file identifying a source tree.
pub const SOURCE_MARKER: &str = ".coffle_source.toml";

/// Newest source format version this build understands.
pub const SOURCE_FORMAT_VERSION: i64 = 1;

/// Private work directory under the source root.
const WORK_DIR: &str = ".coffle";

/// One line of a run report: a fixed label, the path it concerns and an
/// optional free-form detail.
#[derive(Debug)]
pub struct ReportLine {
    /// Outcome label ("Creating", "Blocked", …).
    pub label: &'static str,
    /// The entry's displayed (unescaped) path.
    pub path: PathBuf,
    /// Extra information, empty when there is none.
    pub detail: String,
    /// Whether the entry was processed without a refusal.
    pub success: bool,
}

/// Aggregated outcome of one tree-wide operation.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Per-entry report lines, in processing order.
    pub lines: Vec<ReportLine>,
    /// Number of entries that ended in a refusal.
    pub failures: usize,
}

impl RunReport {
    fn push(&mut self, label: &'static str, path: PathBuf, detail: String, success: bool) {
        if !success {
            self.failures += 1;
        }
        self.lines.push(ReportLine {
            label,
            path,
            detail,
            success,
        });
    }
}

/// One row of the status table.
#[derive(Debug)]
pub struct StatusRow {
    /// Entry kind label.
    pub kind: &'static str,
    /// Build state label.
    pub build: &'static str,
    /// Target state label.
    pub target: &'static str,
    /// Displayed (unescaped) path.
    pub path: PathBuf,
}

/// A validated source tree plus its scanned entries and status records.
#[derive(Debug)]
pub struct Repository {
    layout: Layout,
    format_version: i64,
    entries: Vec<Entry>,
    status: StatusStore,
    renderer: TemplateRenderer,
}

impl Repository {
    /// Open a source tree for operating against `target`.
    ///
    /// # Errors
    ///
    /// Returns a typed [`SourceError`] when the marker is absent or
    /// invalid, a typed status error when the persisted records are
    /// unusable, and an ordinary error when directories cannot be created
    /// or scanned. No mutation happens before validation passes.
    pub fn open(source: &Path, target: &Path) -> Result<Self> {
        let source_root = dunce::canonicalize(source).with_context(|| {
            format!("source directory {} does not exist", source.display())
        })?;
        let format_version = validate_marker(&source_root)?;

        let work = source_root.join(WORK_DIR);
        let layout = Layout {
            output_root: work.join("output"),
            org_root: work.join("org"),
            backup_root: work.join("backup"),
            source_root,
            target_root: target.to_path_buf(),
        };
        fsutil::ensure_dir(&layout.output_root)?;
        fsutil::ensure_dir(&layout.org_root)?;
        fsutil::ensure_dir(&layout.backup_root)?;
        fsutil::ensure_dir(&layout.target_root)?;
        let layout = Layout {
            target_root: dunce::canonicalize(&layout.target_root).with_context(|| {
                format!("resolving target {}", layout.target_root.display())
            })?,
            ..layout
        };

        let status = StatusStore::load(work.join("status.toml"))?;
        let entries = scan(&layout, &status)?;
        tracing::debug!(
            "opened source {} with {} entries",
            layout.source_root.display(),
            entries.len()
        );

        Ok(Self {
            layout,
            format_version,
            entries,
            status,
            renderer: TemplateRenderer,
        })
    }

    /// Initialise `source` as a source tree by writing the marker file.
    ///
    /// Returns `false` (without touching anything) when the directory
    /// already carries a marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or marker cannot be created.
    pub fn init(source: &Path) -> Result<bool> {
        fsutil::ensure_dir(source)?;
        let marker = source.join(SOURCE_MARKER);
        if fsutil::present(&marker) {
            return Ok(false);
        }
        std::fs::write(&marker, format!("version = {SOURCE_FORMAT_VERSION}\n"))
            .with_context(|| format!("writing marker {}", marker.display()))?;
        Ok(true)
    }

    /// The scanned entries, parents before children.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The resolved directory layout.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The source tree's declared format version.
    #[must_use]
    pub const fn format_version(&self) -> i64 {
        self.format_version
    }

    /// Build every entry, parents before children.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering or the filesystem fails; per-entry
    /// no-ops (modified, current) are reported, not errors.
    pub fn build(&mut self, rebuild: bool, overwrite: bool) -> Result<RunReport> {
        let mut report = RunReport::default();
        for entry in &mut self.entries {
            let outcome = entry.build(rebuild, overwrite, &self.renderer)?;
            tracing::debug!("build {}: {}", entry.path().display(), outcome.label());
            report.push(outcome.label(), entry.display_path(), String::new(), true);
        }
        Ok(report)
    }

    /// Install every entry, parents before children so a nested target's
    /// parent directory exists by the time it is needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the filesystem fails. Refusals (blocked,
    /// occupied backup slot, existing target without `--overwrite`) are
    /// counted in the report and do not stop the walk.
    pub fn install(&mut self, overwrite: bool) -> Result<RunReport> {
        let mut report = RunReport::default();
        for entry in &mut self.entries {
            let outcome = entry.install(overwrite, &self.renderer)?;
            let detail = install_detail(entry, outcome);
            tracing::debug!("install {}: {}", entry.path().display(), outcome.label());
            report.push(
                outcome.label(),
                entry.display_path(),
                detail,
                outcome.success(),
            );
        }
        Ok(report)
    }

    /// Uninstall every entry, children before parents so directories are
    /// only removed once emptied.
    ///
    /// # Errors
    ///
    /// Returns an error when the filesystem fails; tampered targets are
    /// refusals counted in the report.
    pub fn uninstall(&mut self) -> Result<RunReport> {
        let mut report = RunReport::default();
        for entry in self.entries.iter_mut().rev() {
            let outcome = entry.uninstall()?;
            tracing::debug!("uninstall {}: {}", entry.path().display(), outcome.label());
            report.push(
                outcome.label(),
                entry.display_path(),
                String::new(),
                outcome.success(),
            );
        }
        Ok(report)
    }

    /// Classify every entry for the status table. Pure read.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem cannot be inspected.
    pub fn status_rows(&self) -> Result<Vec<StatusRow>> {
        self.entries
            .iter()
            .map(|entry| {
                Ok(StatusRow {
                    kind: entry.kind().label(),
                    build: entry.build_state()?.label(),
                    target: entry.target_label(),
                    path: entry.display_path(),
                })
            })
            .collect()
    }

    /// Produce unified diffs between the pristine copy and the edited
    /// output for every modified entry. The diff algorithm itself is
    /// delegated entirely to the `similar` crate; this only selects the
    /// qualifying entries and labels the inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if artifact contents cannot be read.
    pub fn diff(&self) -> Result<String> {
        let mut out = String::new();
        for entry in &self.entries {
            if !entry.modified()? {
                continue;
            }
            let org = std::fs::read_to_string(entry.org())
                .with_context(|| format!("reading {}", entry.org().display()))?;
            let output = std::fs::read_to_string(entry.output())
                .with_context(|| format!("reading {}", entry.output().display()))?;
            let display = entry.display_path();
            let text = similar::TextDiff::from_lines(&org, &output)
                .unified_diff()
                .header(
                    &format!("{} (original)", display.display()),
                    &format!("{} (modified)", display.display()),
                )
                .to_string();
            out.push_str(&text);
        }
        Ok(out)
    }

    /// Human-readable description of the resolved layout.
    #[must_use]
    pub fn describe(&self) -> String {
        let layout = &self.layout;
        format!(
            "source:  {}\noutput:  {}\norg:     {}\nbackup:  {}\ntarget:  {}\nformat:  version {}\nentries: {}\n",
            layout.source_root.display(),
            layout.output_root.display(),
            layout.org_root.display(),
            layout.backup_root.display(),
            layout.target_root.display(),
            self.format_version,
            self.entries.len()
        )
    }

    /// Persist the status records, rewritten wholesale from the entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the status file cannot be written.
    pub fn write_status(&mut self) -> Result<()> {
        let records: Vec<(String, EntryStatus)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    status_key(entry.path()),
                    EntryStatus {
                        skipped: entry.skipped(),
                    },
                )
            })
            .collect();
        self.status.rewrite(records);
        self.status.write()
    }
}

/// Detail column for install report lines.
fn install_detail(entry: &Entry, outcome: InstallOutcome) -> String {
    match outcome {
        InstallOutcome::Created => match entry.kind() {
            EntryKind::Directory => "(directory)".to_string(),
            EntryKind::File => format!("-> {}", entry.link_target().display()),
        },
        InstallOutcome::Overwritten => {
            format!("(backup in {})", entry.backup().display())
        }
        InstallOutcome::Exists => "(not overwriting)".to_string(),
        _ => String::new(),
    }
}

/// Stable, slash-separated form of a relative path for status records.
fn status_key(path: &Path) -> String {
    path.iter()
        .map(|component| component.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Validate the source marker and return its declared format version.
fn validate_marker(source_root: &Path) -> Result<i64, SourceError> {
    let path = source_root.join(SOURCE_MARKER);
    if !fsutil::present(&path) {
        return Err(SourceError::NotASource {
            path: source_root.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(&path).map_err(|source| {
        SourceError::MarkerUnreadable {
            path: path.clone(),
            source,
        }
    })?;
    let value: toml::Value =
        text.parse().map_err(|e: toml::de::Error| SourceError::MarkerCorrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;
    let table = value
        .as_table()
        .ok_or_else(|| SourceError::MarkerNotATable { path: path.clone() })?;
    let version = table
        .get("version")
        .ok_or_else(|| SourceError::VersionMissing { path: path.clone() })?;
    let version = version
        .as_integer()
        .ok_or_else(|| SourceError::VersionNotInteger { path })?;
    if version > SOURCE_FORMAT_VERSION {
        return Err(SourceError::VersionTooNew {
            found: version,
            supported: SOURCE_FORMAT_VERSION,
        });
    }
    Ok(version)
}

/// Scan the source tree into an ordered entry list.
///
/// Pre-order, name-sorted walk: a directory always precedes everything
/// nested beneath it. Dot-prefixed names are implementation-private and
/// pruned entirely; symlinks are never followed, so a symlink to a
/// directory scans as a file-like leaf.
fn scan(layout: &Layout, status: &StatusStore) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(&layout.source_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|item| {
            item.depth() == 0 || !item.file_name().to_string_lossy().starts_with('.')
        });
    for item in walker {
        let item = item.context("scanning source tree")?;
        let relative = item
            .path()
            .strip_prefix(&layout.source_root)
            .context("scanned path outside the source root")?
            .to_path_buf();
        let kind = if item.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let skipped = status.skipped(&status_key(&relative));
        entries.push(Entry::new(layout, relative, kind, skipped));
    }
    Ok(entries)
}
