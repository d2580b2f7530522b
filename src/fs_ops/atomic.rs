//! No-clobber rename.
//! - Same-volume moves go through `hard_link` + unlink: linking fails with
//!   EEXIST when the name is taken, so the occupancy check and the placement
//!   are one filesystem operation and a racing writer can never be replaced.
//! - Filesystems without hard links fall back to a checked rename.
//! - Cross-device errors are returned to the caller, which switches to copy.
//! - On Unix, best-effort fsync of the destination directory afterwards.

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

use super::util::{fsync_dir, is_cross_device};

/// Result of one placement attempt at a specific destination name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    /// The source now lives at the destination and is gone from its old path.
    Placed,
    /// Something already exists at the destination; nothing was touched.
    Occupied,
}

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<Placement> {
    let placement = match fs::hard_link(src, dst) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(src) {
                // Undo the link so the file does not end up in two places.
                let _ = fs::remove_file(dst);
                return Err(e);
            }
            Placement::Placed
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Placement::Occupied),
        Err(e) if e.kind() == io::ErrorKind::NotFound || is_cross_device(&e) => return Err(e),
        Err(e) => {
            trace!(error = %e, src = %src.display(), "hard link unavailable, using checked rename");
            rename_if_absent(src, dst)?
        }
    };

    if placement == Placement::Placed
        && let Some(parent) = dst.parent()
    {
        // Ignore fsync errors to avoid turning a successful move into a failure.
        let _ = fsync_dir(parent);
    }

    Ok(placement)
}

fn rename_if_absent(src: &Path, dst: &Path) -> io::Result<Placement> {
    if fs::symlink_metadata(dst).is_ok() {
        return Ok(Placement::Occupied);
    }
    fs::rename(src, dst)?;
    Ok(Placement::Placed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_into_free_name() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("a.txt");
        let dst = td.path().join("b.txt");
        fs::write(&src, b"payload").unwrap();
        assert_eq!(try_atomic_move(&src, &dst).unwrap(), Placement::Placed);
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn refuses_taken_name_and_leaves_both_files() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("a.txt");
        let dst = td.path().join("b.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();
        assert_eq!(try_atomic_move(&src, &dst).unwrap(), Placement::Occupied);
        assert_eq!(fs::read(&src).unwrap(), b"new");
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn missing_source_is_not_found() {
        let td = tempfile::tempdir().unwrap();
        let err = try_atomic_move(&td.path().join("nope"), &td.path().join("x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
