//! Step command implementation
//!
//! Usage: checkpoint [STEP]
//!
//! Completes the current step of the session in `$CHECKPOINT_SESSION_ID` and
//! reports whether STEP has already been done. Without STEP only the current
//! step is completed.

use anyhow::{Context, Result};

use crate::state::Manager;

/// Returns `true` when `step` was completed by an earlier run.
pub fn execute(mgr: &dyn Manager, session_id: &str, step: &str) -> Result<bool> {
    let session = mgr
        .use_session(session_id, false)
        .with_context(|| format!("failed to access session for {session_id:?}"))?;
    session
        .step(step)
        .with_context(|| format!("failed to execute step {step}"))
}
