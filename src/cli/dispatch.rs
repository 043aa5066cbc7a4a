use anyhow::Result;
use checkpoint::commands::{common, delete, list, state, step, use_cmd};
use checkpoint::config::Config;
use checkpoint::shell::SESSION_ID_ENV_VAR;
use checkpoint::state::Manager;
use clap::CommandFactory;
use std::io;
use std::process::ExitCode;

use super::types::{Cli, Commands};

/// Exit status of the step verb when the step still has to run.
const EXIT_NOT_DONE: u8 = 1;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();

    match cli.command {
        None => {
            let mgr = manager()?;
            let id = std::env::var(SESSION_ID_ENV_VAR).unwrap_or_default();
            let step = cli.step.unwrap_or_default();
            if step::execute(mgr.as_ref(), &id, &step)? {
                return Ok(ExitCode::SUCCESS);
            }
            return Ok(ExitCode::from(EXIT_NOT_DONE));
        }
        Some(Commands::Use { tags }) => {
            let mgr = manager()?;
            let shell = std::env::var("SHELL").unwrap_or_default();
            use_cmd::execute(mgr.as_ref(), &tags, &shell, &program_name(), &mut stdout)?;
        }
        Some(Commands::List) => list::execute(manager()?.as_ref(), &mut stdout)?,
        Some(Commands::State { id }) => {
            let id = common::resolve_session_id(id)?;
            state::summary(manager()?.as_ref(), &id, &mut stdout)?;
        }
        Some(Commands::Dump { id }) => {
            let id = common::resolve_session_id(id)?;
            state::dump(manager()?.as_ref(), &id, &mut stdout)?;
        }
        Some(Commands::Delete { id, steps }) => {
            let id = common::resolve_session_id(id)?;
            delete::execute(manager()?.as_ref(), &id, &steps)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "checkpoint", &mut stdout);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn manager() -> Result<Box<dyn Manager>> {
    let config = Config::load()?;
    tracing::debug!(root = %config.root.display(), backend = ?config.backend, "loaded config");
    config.manager()
}

/// How the shell integration should invoke this binary.
fn program_name() -> String {
    std::env::args()
        .next()
        .filter(|arg| !arg.is_empty())
        .unwrap_or_else(|| "checkpoint".to_string())
}
