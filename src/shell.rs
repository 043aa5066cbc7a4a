//! Shell integration emitted by `checkpoint use`.
//!
//! The output is meant to be sourced (`source <(checkpoint use $0)`): it
//! exports the session ID and defines a `completed` function that records
//! the exit status of the previous command before delegating to the
//! checkpoint binary.

use anyhow::{bail, Context, Result};
use std::borrow::Cow;
use std::process::Command;

pub const SESSION_ID_ENV_VAR: &str = "CHECKPOINT_SESSION_ID";

/// Shells whose function syntax the integration script uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    /// Determine the shell from the value of `$SHELL`.
    pub fn detect(shell: &str) -> Result<Self> {
        if shell.contains("bash") {
            Ok(Shell::Bash)
        } else if shell.contains("zsh") {
            Ok(Shell::Zsh)
        } else {
            bail!("unsupported shell: {shell:?}")
        }
    }

    /// Reject shell versions that cannot run the integration script.
    pub fn check_version(&self) -> Result<()> {
        match self {
            Shell::Bash => {
                let output = Command::new("bash")
                    .arg("--version")
                    .output()
                    .context("Failed to run bash --version")?;
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                check_bash_version(&text)
            }
            // Every zsh in common use supports the script.
            Shell::Zsh => Ok(()),
        }
    }
}

/// Bash 3.2 as shipped with macOS identifies itself with a 2007 copyright.
fn check_bash_version(version_output: &str) -> Result<()> {
    if version_output.contains("2007") {
        bail!(
            "it looks like you are running an old version of bash on a mac, \
             please upgrade to a more recent one"
        );
    }
    Ok(())
}

/// Script that exports `session_id` and defines `completed`.
pub fn integration_script(session_id: &str, program: &str) -> String {
    let program = shell_escape::unix::escape(Cow::Borrowed(program));
    format!(
        r#"export {SESSION_ID_ENV_VAR}={session_id}
function completed() {{
if [[ $? -ne 0 ]]; then
CHECKPOINT_ERROR=true
return 0
fi
[[ "$CHECKPOINT_ERROR" = "true" ]] && return 0
{program} "$@"
}}
"#
    )
}
