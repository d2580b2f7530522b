//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::category::CategoryTable;
use crate::utils::SettleWindow;

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// One line per moved file (default)
    #[default]
    Normal,
    /// Also skipped files and settle waits
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to organize; the CLI argument wins over the config file
    pub directory: Option<PathBuf>,
    /// Keep running and sort files as they arrive
    pub watch: bool,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Stabilization wait used in watch mode
    pub settle: SettleWindow,
    /// File-name suffixes of downloads still in progress (empty: sort everything)
    pub in_progress_suffixes: Vec<String>,
    /// Extension → category mapping
    pub categories: CategoryTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: None,
            watch: false,
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path(),
            settle: SettleWindow::default(),
            in_progress_suffixes: Vec::new(),
            categories: CategoryTable::default(),
        }
    }
}

impl Config {
    /// Construct a Config for `directory` with every other field defaulted.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Default::default()
        }
    }
}
