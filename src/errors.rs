//! Typed error definitions for file_organizer.
//! Per-file failures are recovered by the organizer and accumulated into a
//! summary; configuration failures are fatal before any pass starts.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single file's categorize-and-move step.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Permission denied on {path}: {context}")]
    AccessDenied { path: PathBuf, context: String },

    #[error("Path vanished before it could be moved: {0}")]
    PathVanished(PathBuf),

    #[error("No free name for '{name}' in {dir} after {attempts} attempts")]
    DestinationCollisionExhausted {
        dir: PathBuf,
        name: String,
        attempts: u32,
    },

    #[error("File {0} was still being written when the settle window ran out")]
    StillChanging(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("{context}")]
    Io {
        path: PathBuf,
        context: String,
        #[source]
        source: io::Error,
    },
}

impl OrganizeError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            OrganizeError::AccessDenied { .. } => 13,
            OrganizeError::PathVanished(_) => 2,
            OrganizeError::DestinationCollisionExhausted { .. } => 17,
            OrganizeError::StillChanging(_) => 16,
            OrganizeError::Interrupted => 130,
            OrganizeError::Io { .. } => 5,
        }
    }

    /// Short machine-friendly label, used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            OrganizeError::AccessDenied { .. } => "access_denied",
            OrganizeError::PathVanished(_) => "path_vanished",
            OrganizeError::DestinationCollisionExhausted { .. } => "collision_exhausted",
            OrganizeError::StillChanging(_) => "still_changing",
            OrganizeError::Interrupted => "interrupted",
            OrganizeError::Io { .. } => "io",
        }
    }

    /// Classify an io::Error raised while touching `path` during `op`.
    ///
    /// `source` is the file being moved: NotFound on it means the user (or
    /// another process) removed it, which is not a failure.
    pub(crate) fn from_io(op: &str, path: &std::path::Path, source: &std::path::Path, e: io::Error) -> Self {
        let context = crate::fs_ops::describe_io_error(op, path, &e);
        match e.kind() {
            io::ErrorKind::PermissionDenied => OrganizeError::AccessDenied {
                path: path.to_path_buf(),
                context,
            },
            io::ErrorKind::NotFound if !source.exists() => {
                OrganizeError::PathVanished(source.to_path_buf())
            }
            _ => OrganizeError::Io {
                path: path.to_path_buf(),
                context,
                source: e,
            },
        }
    }
}

/// Failures of the watch subscription itself (not of individual files).
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to watch {path}: {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Filesystem event source for {0} closed unexpectedly")]
    Disconnected(PathBuf),

    #[error("Failed to start the watch thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Watch worker thread panicked")]
    WorkerPanicked,
}

/// Fatal configuration problems, detected before any pass begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Invalid category name '{name}': {reason}")]
    InvalidCategory { name: String, reason: String },

    #[error("Invalid extension '{extension}' in category '{category}': {reason}")]
    InvalidExtension {
        category: String,
        extension: String,
        reason: String,
    },

    #[error("Extension '{extension}' is mapped to both '{first}' and '{second}'")]
    ConflictingExtension {
        extension: String,
        first: String,
        second: String,
    },

    #[error("Target directory {path} is unusable: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}
