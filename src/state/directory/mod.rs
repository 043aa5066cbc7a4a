//! Checkpoint state kept in a local directory.
//!
//! Layout under the manager root:
//!
//! ```text
//! <root>/.lock              manager lock (session creation, listing)
//! <root>/<id>.lock          session lock
//! <root>/<id>/<step>        completed step records, read-only
//! <root>/<id>/.in-progress  current step record
//! <root>/<id>/.metadata     session metadata (JSON)
//! ```
//!
//! Session locks live next to, not inside, the session directory so that
//! deleting a session does not pull the lock file out from under its holder.
//! Lock files are never unlinked, so a deleted session leaves its
//! `<id>.lock` behind; it is reused if the session is created again and is
//! never reported by [`Manager::list`].

mod session;

pub use session::DirectorySession;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Manager, Session};
use crate::error::{CheckpointError, Result};
use crate::fs::LockGuard;
use crate::validation::{validate_session_id, SESSION_LOCK_SUFFIX};

const MANAGER_LOCK_FILE: &str = ".lock";

/// A [`Manager`] backed by a directory per session.
#[derive(Debug, Clone)]
pub struct DirectoryManager {
    root: PathBuf,
}

impl DirectoryManager {
    /// Create a manager rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            CheckpointError::io(
                format!("Failed to create state directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(&self.root.join(MANAGER_LOCK_FILE))
    }

    fn session(&self, id: &str) -> DirectorySession {
        DirectorySession::new(
            id.to_string(),
            self.root.join(id),
            self.root.join(format!("{id}{SESSION_LOCK_SUFFIX}")),
        )
    }
}

impl Manager for DirectoryManager {
    fn use_session(&self, id: &str, reset: bool) -> Result<Box<dyn Session>> {
        validate_session_id(id)?;
        let _lock = self.lock()?;
        let session = self.session(id);
        match fs::create_dir(session.dir()) {
            Ok(()) => tracing::debug!(session = id, "created session"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(CheckpointError::io(
                    format!(
                        "Failed to create session directory: {}",
                        session.dir().display()
                    ),
                    e,
                ))
            }
        }
        if reset {
            session.clear_current()?;
        }
        Ok(Box::new(session))
    }

    fn open_session(&self, id: &str) -> Result<Box<dyn Session>> {
        validate_session_id(id)?;
        let _lock = self.lock()?;
        let session = self.session(id);
        if !session.dir().is_dir() {
            return Err(CheckpointError::SessionNotFound(id.to_string()));
        }
        Ok(Box::new(session))
    }

    fn list(&self) -> Result<Vec<String>> {
        let _lock = self.lock()?;
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("Failed to read state directory: {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CheckpointError::io(
                    format!("Failed to read state directory: {}", self.root.display()),
                    e,
                )
            })?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn manager() -> (TempDir, DirectoryManager) {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path().join("state")).unwrap();
        (temp, mgr)
    }

    #[test]
    fn test_new_creates_root() {
        let (_temp, mgr) = manager();
        assert!(mgr.root().is_dir());
    }

    #[test]
    fn test_use_rejects_empty_id() {
        let (_temp, mgr) = manager();
        let err = mgr.use_session("", true).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_use_rejects_id_too_long_for_lock_file() {
        let (_temp, mgr) = manager();
        let id = "a".repeat(crate::validation::MAX_SESSION_ID_LENGTH + 1);
        let err = mgr.use_session(&id, true).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(mgr.list().unwrap().is_empty());
    }

    #[test]
    fn test_deleted_session_leaves_reusable_lock_file() {
        let (_temp, mgr) = manager();
        let sess = mgr.use_session("s", true).unwrap();
        assert!(!sess.step("a").unwrap());
        sess.delete(&[]).unwrap();

        assert!(!mgr.root().join("s").exists());
        assert!(mgr.root().join("s.lock").is_file());
        assert!(mgr.list().unwrap().is_empty());

        let sess = mgr.use_session("s", true).unwrap();
        assert!(!sess.step("a").unwrap());
        assert_eq!(mgr.list().unwrap(), vec!["s"]);
    }

    #[test]
    fn test_use_rejects_path_like_id() {
        let (_temp, mgr) = manager();
        assert!(mgr.use_session("../escape", true).is_err());
        assert!(mgr.use_session("..", false).is_err());
    }

    #[test]
    fn test_use_creates_session_directory() {
        let (_temp, mgr) = manager();
        let id = mgr.session_id(&["/a/b/c"]);
        let sess = mgr.use_session(&id, true).unwrap();
        assert_eq!(sess.id(), id);
        assert!(mgr.root().join(&id).is_dir());

        // Idempotent.
        mgr.use_session(&id, true).unwrap();
        mgr.use_session(&id, false).unwrap();
        assert_eq!(mgr.list().unwrap(), vec![id]);
    }

    #[test]
    fn test_list_empty_and_sorted() {
        let (_temp, mgr) = manager();
        assert!(mgr.list().unwrap().is_empty());

        for id in ["ccc", "aaa", "bbb"] {
            mgr.use_session(id, true).unwrap();
        }
        // Lock files sit next to the session directories but are not sessions.
        assert!(mgr.root().join("aaa.lock").is_file());
        assert_eq!(mgr.list().unwrap(), vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_open_session_requires_existing() {
        let (_temp, mgr) = manager();
        let err = mgr.open_session("missing").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(mgr.list().unwrap().is_empty());

        mgr.use_session("present", false).unwrap();
        assert_eq!(mgr.open_session("present").unwrap().id(), "present");
    }

    #[test]
    fn test_reset_clears_only_current_step() {
        let (_temp, mgr) = manager();
        let sess = mgr.use_session("s", true).unwrap();
        assert!(!sess.step("a").unwrap());
        assert!(!sess.step("b").unwrap());
        let mut md = crate::state::Metadata::new();
        md.insert("ID".to_string(), "s".into());
        sess.set_metadata(&md).unwrap();

        let sess = mgr.use_session("s", true).unwrap();
        let names: Vec<_> = sess.steps().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(sess.metadata().unwrap(), Some(md));
    }

    #[test]
    fn test_use_without_reset_keeps_current_step() {
        let (_temp, mgr) = manager();
        let sess = mgr.use_session("s", true).unwrap();
        assert!(!sess.step("a").unwrap());

        let sess = mgr.use_session("s", false).unwrap();
        let steps = sess.steps().unwrap();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_in_progress());
    }
}
