mod cli;

use clap::Parser;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{dispatch, Cli};

/// Exit status for any failure, matching clap's usage errors.
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("FAILED: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Logs go to stderr: the stdout of `checkpoint use` is sourced by the shell.
fn init_logging() {
    let debug_enabled = env::var("CHECKPOINT_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
