//! State and dump command implementations
//!
//! Usage: checkpoint state [ID]
//!        checkpoint dump [ID]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::Value;
use std::io::Write;

use crate::commands::common::format_elapsed;
use crate::state::{Manager, Metadata, Session, StepRecord};

fn load(mgr: &dyn Manager, id: &str) -> Result<(Option<Metadata>, Vec<StepRecord>)> {
    let session: Box<dyn Session> = mgr
        .open_session(id)
        .with_context(|| format!("failed to use session {id}"))?;
    let metadata = session
        .metadata()
        .with_context(|| format!("failed to get session metadata {id}"))?;
    let steps = session
        .steps()
        .with_context(|| format!("failed to get session steps {id}"))?;
    Ok((metadata, steps))
}

/// Print a one-line-per-step summary of the session.
pub fn summary(mgr: &dyn Manager, id: &str, out: &mut dyn Write) -> Result<()> {
    let (metadata, steps) = load(mgr, id)?;
    writeln!(out, "{}", header(metadata.as_ref(), id))?;
    let now = Utc::now();
    for step in &steps {
        writeln!(out, "{}", step_line(step, now))?;
    }
    Ok(())
}

/// Print the metadata and every step record as JSON.
pub fn dump(mgr: &dyn Manager, id: &str, out: &mut dyn Write) -> Result<()> {
    let (metadata, steps) = load(mgr, id)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&metadata)?)?;
    for step in &steps {
        writeln!(out, "{}", serde_json::to_string_pretty(step)?)?;
    }
    Ok(())
}

fn header(metadata: Option<&Metadata>, id: &str) -> String {
    let tags: Vec<&str> = metadata
        .and_then(|md| md.get("Tags"))
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let shown_id = metadata
        .and_then(|md| md.get("ID"))
        .and_then(Value::as_str)
        .unwrap_or(id);
    format!("{}: {shown_id}", tags.join(", "))
}

fn step_line(step: &StepRecord, now: DateTime<Utc>) -> String {
    match step.duration() {
        Some(took) => format!("{}: {}", step.name, format_elapsed(took.num_seconds())),
        None => format!(
            "{}: {}: {}... {}",
            step.name,
            "current".yellow(),
            step.created.to_rfc3339(),
            format_elapsed((now - step.created).num_seconds())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::use_cmd;
    use crate::state::DirectoryManager;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_step_line_completed_and_current() {
        let created = Utc::now() - Duration::seconds(200);
        let done = StepRecord {
            name: "build".to_string(),
            created,
            completed: Some(created + Duration::seconds(65)),
        };
        assert_eq!(step_line(&done, Utc::now()), "build: 1m5s");

        let current = StepRecord {
            name: "deploy".to_string(),
            created,
            completed: None,
        };
        let line = step_line(&current, created + Duration::seconds(42));
        assert!(line.starts_with("deploy: "));
        assert!(line.contains("current"));
        assert!(line.ends_with("... 42s"));
    }

    #[test]
    fn test_header_without_metadata() {
        assert_eq!(header(None, "abc"), ": abc");
    }

    #[test]
    fn test_summary_and_dump() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        let tags = vec!["build.sh".to_string(), "prod".to_string()];
        let id = use_cmd::open(&mgr, &tags).unwrap();
        let session = mgr.use_session(&id, false).unwrap();
        session.step("fetch").unwrap();
        session.step("compile").unwrap();

        let mut out = Vec::new();
        summary(&mgr, &id, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("build.sh, prod: {id}"));
        assert_eq!(lines[1], "fetch: 0s");
        assert!(lines[2].starts_with("compile: "));
        assert_eq!(lines.len(), 3);

        let mut out = Vec::new();
        dump(&mgr, &id, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Tags\""));
        assert!(text.contains("\"Name\": \"fetch\""));
        assert!(text.contains("\"Completed\": null"));
    }

    #[test]
    fn test_unknown_session() {
        let temp = TempDir::new().unwrap();
        let mgr = DirectoryManager::new(temp.path()).unwrap();
        let mut out = Vec::new();
        let err = summary(&mgr, "nope", &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("session not found"));
        // Inspection never creates sessions.
        assert!(mgr.list().unwrap().is_empty());
    }
}
