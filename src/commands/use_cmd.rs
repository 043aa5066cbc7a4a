//! Use command implementation
//!
//! Usage: source <(checkpoint use TAG...)
//!
//! Opens (creating if needed) the session identified by the tags, resets its
//! current step, and prints the shell integration for it.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use std::io::Write;

use crate::shell::{integration_script, Shell};
use crate::state::{Manager, Metadata};

/// Open the session for `tags` and record its metadata; returns the session ID.
pub fn open(mgr: &dyn Manager, tags: &[String]) -> Result<String> {
    if tags.is_empty() {
        bail!("no session name provided");
    }
    let inputs: Vec<&str> = tags.iter().map(String::as_str).collect();
    let id = mgr.session_id(&inputs);

    let session = mgr
        .use_session(&id, true)
        .with_context(|| format!("failed to use/create session for {tags:?}"))?;
    let now = Utc::now();
    let mut metadata = session
        .metadata()
        .with_context(|| format!("failed to access metadata for {tags:?}: {id}"))?
        .unwrap_or_else(|| new_metadata(tags, &id, now));
    metadata.insert("Accessed".to_string(), json!(now));
    session
        .set_metadata(&metadata)
        .with_context(|| format!("failed to write metadata for {tags:?}: {id}"))?;
    tracing::debug!(session = %id, ?tags, "session in use");
    Ok(id)
}

fn new_metadata(tags: &[String], id: &str, now: chrono::DateTime<Utc>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("Tags".to_string(), json!(tags));
    metadata.insert("ID".to_string(), Value::String(id.to_string()));
    metadata.insert("Created".to_string(), json!(now));
    metadata
}

/// Execute the use command, writing the integration script to `out`.
pub fn execute(
    mgr: &dyn Manager,
    tags: &[String],
    shell: &str,
    program: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let id = open(mgr, tags)?;
    let shell = Shell::detect(shell)?;
    shell.check_version()?;
    out.write_all(integration_script(&id, program).as_bytes())
        .context("Failed to write shell integration")?;
    Ok(())
}
