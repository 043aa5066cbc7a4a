//! Step records and their on-disk encoding.
//!
//! A record is a small JSON object:
//!
//! ```json
//! {"Step":"build","StepFile":"build","Created":"2024-05-01T10:00:00.123456789Z","Completed":"0001-01-01T00:00:00Z"}
//! ```
//!
//! Timestamps are RFC 3339 in UTC with nanosecond precision. An unset
//! completion time is written as the zero timestamp rather than omitted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CheckpointError, Result};

/// Encoding of an unset timestamp.
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// A named step within a session, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepRecord {
    pub name: String,
    pub created: DateTime<Utc>,
    /// `None` while the step is in progress.
    pub completed: Option<DateTime<Utc>>,
}

impl StepRecord {
    pub fn is_in_progress(&self) -> bool {
        self.completed.is_none()
    }

    /// Time between the step being requested and being completed.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed.map(|completed| completed - self.created)
    }
}

/// Persisted form of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StepState {
    pub step: String,
    /// File name of the permanent record inside the session directory.
    pub step_file: String,
    pub created: String,
    #[serde(default)]
    pub completed: String,
}

impl StepState {
    pub fn in_progress(name: &str, created: DateTime<Utc>) -> Self {
        Self {
            step: name.to_string(),
            step_file: name.to_string(),
            created: format_timestamp(Some(created)),
            completed: format_timestamp(None),
        }
    }

    pub fn complete(mut self, at: DateTime<Utc>) -> Self {
        self.completed = format_timestamp(Some(at));
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| CheckpointError::Encode {
            context: format!("step {}", self.step),
            source,
        })
    }

    /// Decode a record read from `path`; `path` is only used in errors.
    pub fn decode(buf: &[u8], path: &Path) -> Result<Self> {
        let state: StepState =
            serde_json::from_slice(buf).map_err(|e| CheckpointError::Corrupt {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        if state.step.is_empty() || state.step_file.is_empty() {
            return Err(CheckpointError::Corrupt {
                path: path.to_path_buf(),
                details: "missing step name".to_string(),
            });
        }
        if crate::validation::validate_step_name(&state.step_file).is_err() {
            return Err(CheckpointError::Corrupt {
                path: path.to_path_buf(),
                details: format!("illegal step file '{}'", state.step_file),
            });
        }
        Ok(state)
    }

    pub fn to_record(&self, path: &Path) -> Result<StepRecord> {
        let corrupt = |details: String| CheckpointError::Corrupt {
            path: path.to_path_buf(),
            details,
        };
        let created = parse_timestamp(&self.created)
            .map_err(|e| corrupt(format!("bad Created timestamp: {e}")))?
            .ok_or_else(|| corrupt("unset Created timestamp".to_string()))?;
        let completed = parse_timestamp(&self.completed)
            .map_err(|e| corrupt(format!("bad Completed timestamp: {e}")))?;
        Ok(StepRecord {
            name: self.step.clone(),
            created,
            completed,
        })
    }
}

pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Nanos, true),
        None => ZERO_TIMESTAMP.to_string(),
    }
}

/// Parse a timestamp; both the empty string and the zero timestamp mean unset.
pub fn parse_timestamp(s: &str) -> std::result::Result<Option<DateTime<Utc>>, chrono::ParseError> {
    if s.is_empty() || s == ZERO_TIMESTAMP {
        return Ok(None);
    }
    let ts = DateTime::parse_from_rfc3339(s)?;
    Ok(Some(ts.with_timezone(&Utc)))
}
