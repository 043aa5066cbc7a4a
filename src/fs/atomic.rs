//! Crash-safe file replacement.
//!
//! Content is written to a temporary file in the destination directory,
//! flushed to disk, then renamed into place, so readers only ever observe the
//! previous content or the complete new content.

use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Prefix of temporary files; never a legal step name.
pub const TEMP_PREFIX: &str = ".tmp-";

fn stage(dir: &Path, content: &[u8]) -> io::Result<NamedTempFile> {
    let mut tmp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

fn parent_of(path: &Path) -> io::Result<&Path> {
    path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", path.display()),
        )
    })
}

/// Atomically replace `path` with `content`.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = stage(parent_of(path)?, content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically create `path` as a read-only file holding `content`.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] when `path` already exists;
/// an existing file is never replaced.
pub fn create_readonly(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = stage(parent_of(path)?, content)?;
    let mut perms = tmp.as_file().metadata()?.permissions();
    perms.set_readonly(true);
    tmp.as_file().set_permissions(perms)?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}
