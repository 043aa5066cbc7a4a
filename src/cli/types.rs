use checkpoint::validation::clap_step_validator;
use clap::{Parser, Subcommand};

const AFTER_HELP: &str = "\
Each step implicitly acknowledges the previous one provided that the exit
status of the last command or pipeline ($?) represents success.

Example:

  source <(checkpoint use $0)
  completed step1 || <action>
  completed step2 || <action>
  completed
  completed state

Exit status of `checkpoint [STEP]`: 0 if STEP is already done, 1 if it is
not, 2 on failure.";

#[derive(Parser)]
#[command(name = "checkpoint")]
#[command(about = "Record and act on checkpoints in shell scripts", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Step to test for completion; omit to complete the current step
    #[arg(value_parser = clap_step_validator)]
    pub step: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or reuse the session for TAGs and print the shell integration
    Use {
        /// Inputs identifying the session, usually the script path ($0)
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// List all sessions with their metadata
    List,

    /// Display summary state of a session
    #[command(alias = "status")]
    State {
        /// Session ID (default: $CHECKPOINT_SESSION_ID)
        id: Option<String>,
    },

    /// Display full state of a session, in JSON format
    Dump {
        /// Session ID (default: $CHECKPOINT_SESSION_ID)
        id: Option<String>,
    },

    /// Delete a session, or the given steps of it
    Delete {
        /// Session ID (default: $CHECKPOINT_SESSION_ID)
        id: Option<String>,

        /// Steps to delete; the whole session when omitted
        #[arg(value_parser = clap_step_validator)]
        steps: Vec<String>,
    },

    /// Generate a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
