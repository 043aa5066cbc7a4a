//! Advisory lock files for serializing access to checkpoint state
//!
//! Every read-modify-write sequence against a session, and every
//! manager-level operation that creates or enumerates sessions, runs while
//! holding an exclusive `fs2` lock on a dedicated lock file. The lock is
//! released when the returned [`LockGuard`] is dropped, so early returns and
//! `?` propagation release it too.
//!
//! Advisory locks are cooperative - all participants must go through this
//! module for the locking to be effective.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{CheckpointError, Result};

/// Holds an exclusive lock until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Block until an exclusive lock on `path` is held.
    ///
    /// The lock file (and its parent directory) are created when missing and
    /// are never removed: unlinking a lock file while another process waits
    /// on it would let a third process lock a fresh inode concurrently.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CheckpointError::io(
                    format!("Failed to create lock directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                CheckpointError::io(format!("Failed to open lock file: {}", path.display()), e)
            })?;
        file.lock_exclusive().map_err(|e| {
            CheckpointError::io(
                format!("Failed to acquire exclusive lock: {}", path.display()),
                e,
            )
        })?;
        tracing::trace!(path = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well; unlock explicitly so
        // the release does not depend on when the descriptor is closed.
        let _ = FileExt::unlock(&self.file);
        tracing::trace!(path = %self.path.display(), "lock released");
    }
}
