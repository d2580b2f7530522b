//! Safe file move into a category folder.
//! Tries a no-clobber atomic placement first; on a cross-filesystem error it
//! switches to copy+remove for the rest of the attempts. Name collisions walk
//! the numbered candidates from `duplicate` until one is placed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, trace, warn};

use crate::errors::OrganizeError;

use super::atomic::{try_atomic_move, Placement};
use super::copy::copy_then_remove;
use super::duplicate::{numbered_name, MAX_SUFFIX_ATTEMPTS};
use super::util::is_cross_device;

/// Move `src` into `dest_dir`, creating the folder if needed.
///
/// Returns the final path, which is `dest_dir/<name>` or the first free
/// `dest_dir/<stem>(N).<ext>`. An existing file is never overwritten.
pub fn move_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, OrganizeError> {
    let file_name = src.file_name().ok_or_else(|| OrganizeError::Io {
        path: src.to_path_buf(),
        context: format!("source has no file name: {}", src.display()),
        source: io::Error::from(io::ErrorKind::InvalidInput),
    })?;

    fs::create_dir_all(dest_dir)
        .map_err(|e| OrganizeError::from_io("create category folder", dest_dir, src, e))?;

    let mut cross_device = false;
    for n in 0..=MAX_SUFFIX_ATTEMPTS {
        let candidate = dest_dir.join(numbered_name(file_name, n));

        let attempt = if cross_device {
            copy_then_remove(src, &candidate)
        } else {
            match try_atomic_move(src, &candidate) {
                Err(e) if is_cross_device(&e) => {
                    warn!(src = %src.display(), dest = %candidate.display(), "Cross-filesystem move, copying instead");
                    cross_device = true;
                    copy_then_remove(src, &candidate)
                }
                other => other,
            }
        };

        match attempt.map_err(|e| OrganizeError::from_io("move file", &candidate, src, e))? {
            Placement::Placed => {
                if n > 0 {
                    info!(src = %src.display(), dest = %candidate.display(), suffix = n, "Name was taken, used numbered name");
                }
                return Ok(candidate);
            }
            Placement::Occupied => {
                trace!(dest = %candidate.display(), "destination name taken");
            }
        }
    }

    Err(OrganizeError::DestinationCollisionExhausted {
        dir: dest_dir.to_path_buf(),
        name: file_name.to_string_lossy().into_owned(),
        attempts: MAX_SUFFIX_ATTEMPTS,
    })
}
