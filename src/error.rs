//! Error types for checkpoint state operations.

use std::path::PathBuf;

/// Broad classification of a [`CheckpointError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Io,
}

/// All errors that can occur while reading or mutating checkpoint state.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    // ─────────────────────────────────────────────────────────────────────
    // Caller errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    // ─────────────────────────────────────────────────────────────────────
    // Step reuse
    // ─────────────────────────────────────────────────────────────────────
    #[error("step {step} is being reused: {}", path.display())]
    StepReused { step: String, path: PathBuf },

    #[error("step {step} is being reused or it could not be accessed: {}: {source}", path.display())]
    StepInaccessible {
        step: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Storage errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record {}: {details}", path.display())]
    Corrupt { path: PathBuf, details: String },

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckpointError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CheckpointError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckpointError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CheckpointError::SessionNotFound(_) => ErrorKind::NotFound,
            CheckpointError::StepReused { .. } | CheckpointError::StepInaccessible { .. } => {
                ErrorKind::Conflict
            }
            CheckpointError::Io { .. }
            | CheckpointError::Corrupt { .. }
            | CheckpointError::Encode { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckpointError>;
