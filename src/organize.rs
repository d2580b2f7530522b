//! Organizer pass.
//!
//! Scans the direct children of the root, keeps only regular files, and moves
//! each one into `root/<category>`. Every file is handled independently: a
//! failure is recorded in the [`PassSummary`] and the pass moves on.
//!
//! The per-file step ([`Organizer::organize_file`]) is the single place where
//! skip rules live; the watch loop calls exactly the same function, so both
//! modes sort files identically.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::category::CategoryTable;
use crate::errors::{ConfigError, OrganizeError};
use crate::fs_ops::move_into;
use crate::shutdown::CancelToken;

/// Suffixes browsers and download managers use for files still being written.
///
/// Not applied unless configured: by default every regular file is sorted.
pub const COMMON_IN_PROGRESS_SUFFIXES: &[&str] =
    &[".part", ".crdownload", ".download", ".tmp", ".aria2"];

/// Why a file was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already inside the folder its category points to.
    AlreadySorted,
    /// Not a direct child of the root (e.g. inside a category folder).
    NotInRoot,
    /// Not a regular file (directory, symlink, socket, ...).
    NotAFile,
    /// Looks like a download in progress.
    InProgress,
    /// Removed before it could be moved.
    Vanished,
    /// Shutdown was requested while waiting on the file.
    Interrupted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::AlreadySorted => "already in its category folder",
            SkipReason::NotInRoot => "not a direct child of the root",
            SkipReason::NotAFile => "not a regular file",
            SkipReason::InProgress => "download in progress",
            SkipReason::Vanished => "vanished before it could be moved",
            SkipReason::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Result of organizing one file.
#[derive(Debug)]
pub enum FileOutcome {
    Moved {
        from: PathBuf,
        to: PathBuf,
        category: String,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
    },
    Failed {
        path: PathBuf,
        error: OrganizeError,
    },
}

impl FileOutcome {
    /// Turn an error into an outcome; vanished or interrupted files are skips, not failures.
    pub(crate) fn from_error(path: PathBuf, error: OrganizeError) -> Self {
        match error {
            OrganizeError::PathVanished(_) => FileOutcome::Skipped {
                path,
                reason: SkipReason::Vanished,
            },
            OrganizeError::Interrupted => FileOutcome::Skipped {
                path,
                reason: SkipReason::Interrupted,
            },
            error => FileOutcome::Failed { path, error },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Moved { from, .. } => from,
            FileOutcome::Skipped { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    /// Emit the outcome as a structured log event.
    pub fn log(&self) {
        match self {
            FileOutcome::Moved { from, to, category } => {
                info!(src = %from.display(), dest = %to.display(), %category, "Moved file");
            }
            FileOutcome::Skipped { path, reason } => {
                debug!(path = %path.display(), %reason, "Skipped");
            }
            FileOutcome::Failed { path, error } => {
                error!(path = %path.display(), code = error.code(), kind = error.kind(), error = %error, "Failed to organize file");
            }
        }
    }
}

/// Aggregate of one pass (or one watch event).
#[derive(Debug, Default)]
pub struct PassSummary {
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, OrganizeError)>,
}

impl PassSummary {
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Moved { from, to, .. } => self.moved.push((from, to)),
            FileOutcome::Skipped { path, reason } => self.skipped.push((path, reason)),
            FileOutcome::Failed { path, error } => self.failed.push((path, error)),
        }
    }

    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moved, {} skipped, {} failed",
            self.moved_count(),
            self.skipped_count(),
            self.failed_count()
        )
    }
}

/// Sorts the direct children of one root directory into category folders.
#[derive(Debug, Clone)]
pub struct Organizer {
    root: PathBuf,
    categories: Arc<CategoryTable>,
    in_progress_suffixes: Vec<String>,
}

impl Organizer {
    /// Create an organizer for `root`, which must be an existing, readable directory.
    ///
    /// The root is canonicalized so that paths reported by the OS (watch
    /// events) compare equal to the paths the organizer builds.
    pub fn new(root: impl AsRef<Path>, categories: Arc<CategoryTable>) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        let invalid = |reason: String| ConfigError::InvalidRoot {
            path: root.to_path_buf(),
            reason,
        };
        let meta = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
        if !meta.is_dir() {
            return Err(invalid("not a directory".into()));
        }
        fs::read_dir(root).map_err(|e| invalid(format!("cannot list directory: {e}")))?;
        let canonical = dunce::canonicalize(root).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            root: canonical,
            categories,
            in_progress_suffixes: Vec::new(),
        })
    }

    /// Replace the in-progress suffix list (matched case-insensitively against the file name).
    pub fn with_in_progress_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.in_progress_suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Run one pass over the root.
    pub fn organize(&self) -> PassSummary {
        self.organize_until(&CancelToken::new())
    }

    /// Run one pass, stopping before the next file once `cancel` is set.
    /// Files already moved stay moved.
    pub fn organize_until(&self, cancel: &CancelToken) -> PassSummary {
        info!(root = %self.root.display(), "Starting organization");
        let mut summary = PassSummary::default();

        for path in self.scan() {
            if cancel.is_requested() {
                warn!(moved = summary.moved_count(), "Organization interrupted");
                break;
            }
            let outcome = self.organize_file(&path);
            outcome.log();
            summary.record(outcome);
        }

        if summary.is_clean() {
            info!(
                moved = summary.moved_count(),
                skipped = summary.skipped_count(),
                "Organization complete"
            );
        } else {
            warn!(
                moved = summary.moved_count(),
                skipped = summary.skipped_count(),
                failed = summary.failed_count(),
                "Organization complete with failures"
            );
        }
        summary
    }

    /// Regular files directly inside the root, sorted by name.
    fn scan(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    }

    /// Categorize and move a single file.
    ///
    /// Shared by the one-shot pass and the watch loop.
    pub fn organize_file(&self, path: &Path) -> FileOutcome {
        let category = match self.classify(path) {
            Ok(category) => category,
            Err(skipped) => return skipped,
        };
        let dest_dir = self.root.join(category);

        match move_into(path, &dest_dir) {
            Ok(to) => FileOutcome::Moved {
                from: path.to_path_buf(),
                to,
                category: category.to_string(),
            },
            Err(e) => FileOutcome::from_error(path.to_path_buf(), e),
        }
    }

    /// Apply the skip rules to `path` without touching it.
    ///
    /// Returns the category the file belongs to, or the outcome to report when
    /// the file must be left alone.
    pub(crate) fn classify(&self, path: &Path) -> Result<&str, FileOutcome> {
        let skip = |reason| FileOutcome::Skipped {
            path: path.to_path_buf(),
            reason,
        };

        match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_file() => {}
            Ok(_) => return Err(skip(SkipReason::NotAFile)),
            Err(e) => {
                return Err(FileOutcome::from_error(
                    path.to_path_buf(),
                    OrganizeError::from_io("stat", path, path, e),
                ));
            }
        }

        let Some(parent) = path.parent() else {
            return Err(skip(SkipReason::NotInRoot));
        };
        let parent = dunce::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());

        let category = self.categories.resolve_path(path);
        if parent == self.root.join(category) {
            return Err(skip(SkipReason::AlreadySorted));
        }
        if parent != self.root {
            return Err(skip(SkipReason::NotInRoot));
        }
        if self.is_in_progress(path) {
            return Err(skip(SkipReason::InProgress));
        }
        Ok(category)
    }

    fn is_in_progress(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        self.in_progress_suffixes
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
    }
}

/// Organize `root` once with the given table.
pub fn organize(root: impl AsRef<Path>, categories: Arc<CategoryTable>) -> Result<PassSummary, ConfigError> {
    Ok(Organizer::new(root, categories)?.organize())
}
