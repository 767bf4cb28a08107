//! Reading STL files into memory and committing patched buffers back to disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StlError, StlResult};
use crate::types::{WriteMode, HEADER_SIZE};

/// Read a whole binary STL file into an owned buffer.
///
/// Fails with [`StlError::FileTooSmall`] if the file is 84 bytes or fewer.
/// The returned buffer is independent of the file; nothing on disk changes.
pub fn load_stl_bytes(path: &Path) -> StlResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| StlError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes.len() <= HEADER_SIZE {
        return Err(StlError::FileTooSmall {
            actual_size: bytes.len(),
        });
    }

    debug!("Loaded {} bytes from {:?}", bytes.len(), path);
    Ok(bytes)
}

/// Write a patched buffer over the file at `path`.
pub fn write_stl_bytes(path: &Path, bytes: &[u8], mode: WriteMode) -> StlResult<()> {
    match mode {
        WriteMode::InPlace => fs::write(path, bytes).map_err(|e| StlError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?,
        WriteMode::AtomicRename => write_atomic(path, bytes)?,
    }

    info!("Wrote {} bytes to {:?} ({:?})", bytes.len(), path, mode);
    Ok(())
}

/// Stage the bytes in a sibling temp file, then rename it over the target.
///
/// The temp file lives in the target's directory so the rename never crosses
/// filesystems. On any failure the original file is left as it was.
fn write_atomic(path: &Path, bytes: &[u8]) -> StlResult<()> {
    let io_err = |e: std::io::Error| StlError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    // Keep the original's mode bits; temp files are created owner-only.
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_err)?;
    }

    debug!("Renaming {:?} over {:?}", tmp.path(), path);
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
