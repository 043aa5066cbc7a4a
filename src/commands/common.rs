//! Helpers shared across command implementations.

use anyhow::{bail, Result};

use crate::shell::SESSION_ID_ENV_VAR;

/// Pick the session ID from an explicit argument, falling back to
/// `$CHECKPOINT_SESSION_ID`.
pub fn resolve_session_id(arg: Option<String>) -> Result<String> {
    resolve_from(arg, std::env::var(SESSION_ID_ENV_VAR).ok())
}

fn resolve_from(arg: Option<String>, env: Option<String>) -> Result<String> {
    match arg.or(env).filter(|id| !id.is_empty()) {
        Some(id) => Ok(id),
        None => bail!(
            "no session found either as an argument or as environment variable {SESSION_ID_ENV_VAR}"
        ),
    }
}

/// Format a number of seconds as a compact duration ("42s", "3m5s", "2h10m").
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m{}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h{}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
