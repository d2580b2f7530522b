//! Cross-device fallback: copy, then delete the original.
//!
//! - The destination is opened with `create_new`, so an existing file is never
//!   clobbered; a taken name is reported as `Occupied` and nothing is written.
//! - Buffered copy with large (1 MiB) buffers, then `sync_all` before the
//!   source is removed.
//! - Any failure removes the partial destination; a source that cannot be
//!   deleted also rolls the copy back, so the file never ends up in two places.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::atomic::Placement;
use super::util::fsync_dir;

const BUF_SIZE: usize = 1024 * 1024;

pub(super) fn copy_then_remove(src: &Path, dst: &Path) -> io::Result<Placement> {
    let src_file = File::open(src)?;
    let src_meta = src_file.metadata()?;

    let dst_file = match OpenOptions::new().write(true).create_new(true).open(dst) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(Placement::Occupied),
        Err(e) => return Err(e),
    };

    let copied = copy_streaming(src_file, dst_file);
    let bytes = match copied {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(dst);
            return Err(e);
        }
    };

    // Best-effort: carry the permission bits over, like a rename would.
    let _ = fs::set_permissions(dst, src_meta.permissions());

    if let Err(e) = fs::remove_file(src) {
        let _ = fs::remove_file(dst);
        return Err(e);
    }

    if let Some(parent) = dst.parent() {
        let _ = fsync_dir(parent);
    }
    debug!(src = %src.display(), dest = %dst.display(), bytes, "copied across devices and removed source");
    Ok(Placement::Placed)
}

fn copy_streaming(src: File, dst: File) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, src);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(bytes)
}
