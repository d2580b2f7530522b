//! Platform-specific helpers.
//! Hides Unix/Windows differences for the few places that care about file
//! modes: the log file and the config template.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600,
    write_config_secure_new_0600,
};

#[cfg(not(unix))]
pub use windows::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600,
    write_config_secure_new_0600,
};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique hidden sibling of `target` used as the staging file for atomic writes.
/// Pattern: .file_organizer.tmp.<pid>.<nanos>.<seq>
pub(crate) fn tmp_sibling_name(target: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = format!(".file_organizer.tmp.{pid}.{nanos}.{seq}");
    target.parent().unwrap_or_else(|| Path::new(".")).join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tmp_names_are_unique_and_hidden() {
        let target = Path::new("/cfg/config.xml");
        let names: HashSet<_> = (0..64).map(|_| tmp_sibling_name(target)).collect();
        assert_eq!(names.len(), 64);
        for n in &names {
            assert_eq!(n.parent(), Some(Path::new("/cfg")));
            assert!(n.file_name().unwrap().to_string_lossy().starts_with('.'));
        }
    }
}
