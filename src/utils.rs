use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::errors::OrganizeError;
use crate::shutdown::CancelToken;

/// How long to wait for a freshly reported file to stop changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleWindow {
    /// Pause between two size samples.
    pub interval: Duration,
    /// Re-samples after the first read before giving up.
    pub checks: u32,
}

impl Default for SettleWindow {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            checks: 20,
        }
    }
}

/// Wait until `path` has the same size across two consecutive samples.
///
/// Example: checks=2 -> read, sleep, read (equal -> Ok), else sleep, read
/// (equal -> Ok) else `StillChanging`. A missing file is `PathVanished`;
/// cancellation during a sleep is `Interrupted`.
pub(crate) fn stable_file_probe(
    path: &Path,
    window: SettleWindow,
    cancel: &CancelToken,
) -> Result<(), OrganizeError> {
    let size_of = |p: &Path| {
        fs::metadata(p)
            .map(|m| m.len())
            .map_err(|e| OrganizeError::from_io("stat", p, p, e))
    };

    let mut last_size = size_of(path)?;
    for _ in 0..window.checks {
        if cancel.is_requested() {
            return Err(OrganizeError::Interrupted);
        }
        sleep_unless_cancelled(window.interval, cancel);
        if cancel.is_requested() {
            return Err(OrganizeError::Interrupted);
        }
        let size = size_of(path)?;
        if size == last_size {
            return Ok(());
        }
        debug!(path = %path.display(), last_size, size, "file still growing");
        last_size = size;
    }
    Err(OrganizeError::StillChanging(path.to_path_buf()))
}

/// Sleep for `total`, waking early (in small slices) once `cancel` is set.
pub(crate) fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() && !cancel.is_requested() {
        let step = remaining.min(SLICE);
        std::thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}

/// Trim surrounding quotes and one trailing separator from a user-supplied path.
pub(crate) fn sanitize_path_str(s: &str) -> std::path::PathBuf {
    let trimmed = s.trim();
    let mut inner = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.trim_matches(|c| c == '\'' || c == '"').to_string()
    };

    // Avoid stripping root "/" or "C:\" patterns.
    if (inner.ends_with('\\') || inner.ends_with('/'))
        && inner.len() > 1
        && !inner.ends_with(":\\")
        && !inner.ends_with(":/")
    {
        inner.pop();
    }
    std::path::PathBuf::from(inner)
}
