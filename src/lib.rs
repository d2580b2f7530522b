//! Core library for `file_organizer`.
//!
//! Sorts the files sitting directly inside a directory into per-category
//! subfolders (`Images/`, `Documents/`, ..., `Others/`) chosen by file
//! extension. A pass can run once ([`organize`]) or the directory can be
//! watched so new arrivals are sorted as they land ([`watch`], [`spawn_watch`]).
//!
//! Moves never overwrite: a name already taken in the category folder gets a
//! numbered variant (`report(1).pdf`).

pub mod category;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod logging;
pub mod organize;
pub mod output;
pub mod platform;
pub mod shutdown;
pub mod utils;
pub mod watch;

pub use category::{CategoryTable, DEFAULT_CATEGORIES, FALLBACK_CATEGORY, extension_of};
pub use config::types::{Config, LogLevel};
pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use errors::{ConfigError, OrganizeError, WatchError};
pub use fs_ops::{MAX_SUFFIX_ATTEMPTS, move_into, numbered_name};
pub use organize::{FileOutcome, Organizer, PassSummary, SkipReason, organize};
pub use shutdown::CancelToken;
pub use utils::SettleWindow;
pub use watch::{Subscription, WatchHandle, spawn_watch, watch, watch_with};
