//! Delete command implementation
//!
//! Usage: checkpoint delete [ID] [STEP]...

use anyhow::{Context, Result};

use crate::error::ErrorKind;
use crate::state::Manager;

/// Delete the given steps of a session, or the whole session when `steps`
/// is empty. Deleting from a session that does not exist succeeds.
pub fn execute(mgr: &dyn Manager, id: &str, steps: &[String]) -> Result<()> {
    let session = match mgr.open_session(id) {
        Ok(session) => session,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(session = id, "nothing to delete");
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to access session for {id:?}"))
        }
    };
    let steps: Vec<&str> = steps.iter().map(String::as_str).collect();
    session
        .delete(&steps)
        .with_context(|| format!("failed to delete from session {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DirectoryManager;
    use tempfile::TempDir;

    #[test]
    fn test_delete_steps_then_session() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        let session = mgr.use_session("s", true).unwrap();
        for step in ["a", "b", ""] {
            session.step(step).unwrap();
        }

        execute(&mgr, "s", &["a".to_string()]).unwrap();
        let names: Vec<_> = session.steps().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b"]);

        execute(&mgr, "s", &[]).unwrap();
        assert!(mgr.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_session_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        execute(&mgr, "missing", &[]).unwrap();
        execute(&mgr, "missing", &["a".to_string()]).unwrap();
        assert!(mgr.list().unwrap().is_empty());
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn test_delete_rejects_invalid_id() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        assert!(execute(&mgr, "../escape", &[]).is_err());
    }
}
