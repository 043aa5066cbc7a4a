//! Record and act on checkpoints in shell scripts.
//!
//! Checkpoints are grouped into sessions and represent steps in some
//! sequential computation. Re-running a script skips the steps that a
//! previous run already completed:
//!
//! ```sh
//! source <(checkpoint use $0)
//! completed step1 || <action>
//! completed step2 || <action>
//! completed
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod shell;
pub mod state;
pub mod validation;

pub use error::{CheckpointError, ErrorKind, Result};
