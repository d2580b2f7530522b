//! Config validation logic.
//! Verifies the target directory is usable and the runtime settings are sane.

use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::ConfigError;

use super::types::Config;

impl Config {
    /// Validate the target directory and numeric settings.
    ///
    /// Category names and extensions are validated when the table is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.directory.as_deref() {
            ensure_dir_exists_and_is_dir(dir)?;
            ensure_readable(dir)?;
        }

        if self.settle.interval.is_zero() || self.settle.checks == 0 {
            return Err(ConfigError::Malformed {
                path: "<settings>".into(),
                reason: "settle interval and checks must both be greater than zero".into(),
            });
        }

        if let Some(log) = self.log_file.as_deref()
            && log.is_dir()
        {
            return Err(ConfigError::Malformed {
                path: log.to_path_buf(),
                reason: "log_file points at a directory".into(),
            });
        }

        info!(
            directory = %self
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into()),
            watch = self.watch,
            categories = self.categories.categories().len(),
            "Config validated"
        );
        Ok(())
    }
}

fn invalid_root(path: &Path, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidRoot {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        error!(path = %path.display(), "Target directory does not exist");
        return Err(invalid_root(path, "does not exist"));
    }
    if !path.is_dir() {
        error!(path = %path.display(), "Target is not a directory");
        return Err(invalid_root(path, "not a directory"));
    }
    Ok(())
}

/// Ensure directory is readable by attempting to open its entries.
fn ensure_readable(path: &Path) -> Result<(), ConfigError> {
    fs::read_dir(path)
        .map_err(|e| invalid_root(path, format!("cannot be read ({e}); check permissions")))?;
    debug!(path = %path.display(), "Target directory readable");
    Ok(())
}
