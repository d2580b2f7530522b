//! CLI definition and parsing.
//!
//! - DIRECTORY is required unless `--print-config` or `--write-config` is given.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::utils::sanitize_path_str;

/// Sort the files of a directory into category folders by extension.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Sort a directory's files into category folders (Rust)")]
pub struct Args {
    /// Directory to organize. Only its direct children are sorted.
    #[arg(
        value_name = "DIRECTORY",
        value_hint = ValueHint::DirPath,
        required_unless_present_any = ["print_config", "write_config"]
    )]
    pub directory: Option<String>,

    /// Keep running after the first pass and sort new files as they arrive.
    #[arg(short = 'w', long, help = "Watch the directory and sort new files until Ctrl-C")]
    pub watch: bool,

    /// Explicit config file (overrides FILE_ORGANIZER_CONFIG and the default location).
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also append logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print the config file location in use, then exit.
    #[arg(long, help = "Print the config file location used by file_organizer and exit")]
    pub print_config: bool,

    /// Write a commented template config at the default location, then exit.
    #[arg(long, help = "Write a template config file and exit")]
    pub write_config: bool,
}

impl Args {
    /// Target directory with surrounding quotes and a trailing separator removed.
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory.as_deref().map(sanitize_path_str)
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(dir) = self.resolved_directory() {
            cfg.directory = Some(dir);
        }
        if self.watch {
            cfg.watch = true;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_log_level() {
        let args = Args::try_parse_from(["file_organizer", "/in", "--log-level", "quiet", "-d"]).unwrap();
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn unknown_log_level_is_ignored() {
        let args = Args::try_parse_from(["file_organizer", "/in", "--log-level", "loud"]).unwrap();
        assert_eq!(args.effective_log_level(), None);
    }
}
