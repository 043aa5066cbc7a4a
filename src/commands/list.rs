//! List command implementation
//!
//! Usage: checkpoint list

use anyhow::{Context, Result};
use std::io::Write;

use crate::state::Manager;

/// Print every session ID along with its metadata.
pub fn execute(mgr: &dyn Manager, out: &mut dyn Write) -> Result<()> {
    let sessions = mgr.list().context("failed to list sessions")?;
    for id in sessions {
        let session = mgr
            .open_session(&id)
            .with_context(|| format!("failed to use session {id}"))?;
        let metadata = session
            .metadata()
            .with_context(|| format!("failed to obtain metadata for session {id}"))?;
        let pretty = serde_json::to_string_pretty(&metadata)
            .context("failed to format session metadata")?;
        writeln!(out, "{id}: {pretty}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::use_cmd;
    use crate::state::DirectoryManager;
    use tempfile::TempDir;

    #[test]
    fn test_list_sessions_with_metadata() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        let with_md = use_cmd::open(&mgr, &["deploy.sh".to_string()]).unwrap();
        mgr.use_session("bare", true).unwrap();

        let mut out = Vec::new();
        execute(&mgr, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("bare: null\n"));
        assert!(text.contains(&format!("{with_md}: {{")));
        assert!(text.contains("\"deploy.sh\""));
    }

    #[test]
    fn test_list_empty() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        let mut out = Vec::new();
        execute(&mgr, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
