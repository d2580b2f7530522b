//! I/O error helpers.
//!
//! Enrich io::Error with the operation, the path involved and a platform-aware
//! hint, so per-file failures in a pass summary are actionable on their own.

use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
pub(crate) fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" (permission denied; check ownership and write permissions)");
                }
                libc::EXDEV => {
                    msg.push_str(" (cross-filesystem; rename not possible, copy required)");
                }
                libc::EBUSY => {
                    msg.push_str(" (resource busy; another process may still be writing)");
                }
                libc::ENOENT => {
                    msg.push_str(" (path not found; it may have been removed)");
                }
                libc::EEXIST => {
                    msg.push_str(" (already exists)");
                }
                libc::ENOSPC => {
                    msg.push_str(" (insufficient space on device)");
                }
                libc::EROFS => {
                    msg.push_str(" (read-only filesystem; cannot write here)");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" (file name or path too long)");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                5 => msg.push_str(" (access denied; check permissions)"), // ERROR_ACCESS_DENIED
                17 => msg.push_str(" (not same device; copy required)"), // ERROR_NOT_SAME_DEVICE
                32 => msg.push_str(" (sharing violation; file is in use)"), // ERROR_SHARING_VIOLATION
                2 | 3 => msg.push_str(" (path not found; it may have been removed)"),
                80 | 183 => msg.push_str(" (already exists)"), // ERROR_FILE_EXISTS / ERROR_ALREADY_EXISTS
                112 => msg.push_str(" (insufficient disk space)"), // ERROR_DISK_FULL
                206 => msg.push_str(" (file name or path too long)"), // ERROR_FILENAME_EXCED_RANGE
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" (permission denied; check ownership and write permissions)");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" (path not found; it may have been removed)");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" (already exists)");
            }
            _ => {}
        }
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_operation_and_path() {
        let p = Path::new("/nonexistent/for/test");
        let msg = describe_io_error("open", p, &io::Error::from(io::ErrorKind::NotFound));
        assert!(msg.contains("open"));
        assert!(msg.contains("/nonexistent/for/test"));
        assert!(msg.contains("path not found"));
    }

    #[cfg(unix)]
    #[test]
    fn exdev_hint_and_code_present() {
        let msg = describe_io_error(
            "rename",
            Path::new("/tmp/x"),
            &io::Error::from_raw_os_error(libc::EXDEV),
        );
        assert!(msg.contains("cross-filesystem"), "msg was: {msg}");
        assert!(msg.contains("os code"), "msg was: {msg}");
    }
}
