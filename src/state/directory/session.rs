//! A single session directory and its step transitions.

use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CheckpointError, Result};
use crate::fs::{create_readonly, write_atomic, LockGuard};
use crate::state::record::{parse_timestamp, StepState};
use crate::state::{Metadata, Session, StepRecord};
use crate::validation::validate_step_name;

const CURRENT_STEP_FILE: &str = ".in-progress";
const METADATA_FILE: &str = ".metadata";

/// A [`Session`] stored as one directory of step records.
#[derive(Debug, Clone)]
pub struct DirectorySession {
    id: String,
    dir: PathBuf,
    lock_path: PathBuf,
}

impl DirectorySession {
    pub(super) fn new(id: String, dir: PathBuf, lock_path: PathBuf) -> Self {
        Self { id, dir, lock_path }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(&self.lock_path)
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(CURRENT_STEP_FILE)
    }

    fn step_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CheckpointError::io(
                format!("Failed to create session directory: {}", self.dir.display()),
                e,
            )
        })
    }

    /// Drop the in-progress marker, if any.
    pub(super) fn clear_current(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.remove_current()
    }

    fn remove_current(&self) -> Result<()> {
        let path = self.current_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckpointError::io(
                format!("Failed to remove current step: {}", path.display()),
                e,
            )),
        }
    }

    fn read_current(&self) -> Result<Option<StepState>> {
        let path = self.current_path();
        match fs::read(&path) {
            Ok(buf) => StepState::decode(&buf, &path).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CheckpointError::io(
                format!("Failed to read current step: {}", path.display()),
                e,
            )),
        }
    }

    /// Complete the in-progress step unless it is `next` itself.
    fn mark_done(&self, next: &str) -> Result<()> {
        let Some(current) = self.read_current()? else {
            return Ok(());
        };
        if current.step_file == next {
            return Ok(());
        }

        let target = self.step_path(&current.step_file);
        if check_target(&current, &target)? {
            tracing::debug!(
                session = %self.id,
                step = %current.step,
                "removing marker left behind by an interrupted completion"
            );
            return self.remove_current();
        }

        let done = current.complete(Utc::now());
        match create_readonly(&target, &done.encode()?) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(CheckpointError::StepReused {
                    step: done.step,
                    path: target,
                })
            }
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("Failed to record completed step: {}", target.display()),
                    e,
                ))
            }
        }
        self.remove_current()?;
        tracing::debug!(session = %self.id, step = %done.step, "step completed");
        Ok(())
    }

    fn load_record(path: &Path) -> Result<StepRecord> {
        let buf = fs::read(path).map_err(|e| {
            CheckpointError::io(format!("Failed to read step: {}", path.display()), e)
        })?;
        StepState::decode(&buf, path)?.to_record(path)
    }
}

/// Check that `current` can be installed at `target`.
///
/// Returns `Ok(false)` when the target is free and `Ok(true)` when it already
/// holds the completed form of `current`. Any other existing target, or one
/// that cannot be inspected, means the step is being reused.
fn check_target(current: &StepState, target: &Path) -> Result<bool> {
    match fs::symlink_metadata(target) {
        Ok(_) if is_installed(current, target) => Ok(true),
        Ok(_) => Err(CheckpointError::StepReused {
            step: current.step.clone(),
            path: target.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CheckpointError::StepInaccessible {
            step: current.step.clone(),
            path: target.to_path_buf(),
            source: e,
        }),
    }
}

/// Whether `target` already holds the completed form of `current`.
fn is_installed(current: &StepState, target: &Path) -> bool {
    fs::read(target)
        .ok()
        .and_then(|buf| StepState::decode(&buf, target).ok())
        .is_some_and(|installed| {
            installed.step == current.step
                && installed.created == current.created
                && matches!(parse_timestamp(&installed.completed), Ok(Some(_)))
        })
}

impl Session for DirectorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn step(&self, name: &str) -> Result<bool> {
        if !name.is_empty() {
            validate_step_name(name)?;
        }
        let _lock = self.lock()?;

        self.mark_done(name)?;

        if name.is_empty() {
            return Ok(true);
        }

        let path = self.step_path(name);
        match fs::metadata(&path) {
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("Failed to check step: {}", path.display()),
                    e,
                ))
            }
        }

        self.ensure_dir()?;
        let state = StepState::in_progress(name, Utc::now());
        let current = self.current_path();
        write_atomic(&current, &state.encode()?).map_err(|e| {
            CheckpointError::io(
                format!("Failed to record current step: {}", current.display()),
                e,
            )
        })?;
        tracing::debug!(session = %self.id, step = name, "step started");
        Ok(false)
    }

    fn steps(&self) -> Result<Vec<StepRecord>> {
        let _lock = self.lock()?;
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("Failed to read session directory: {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut steps = Vec::new();
        let mut current = None;
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let is_current = file_name == CURRENT_STEP_FILE;
            if file_name.starts_with('.') && !is_current {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            match Self::load_record(&path) {
                Ok(record) if is_current => current = Some(record),
                Ok(record) => steps.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping step record")
                }
            }
        }

        // A marker identical to a record already on disk is a leftover of an
        // interrupted completion; the permanent record wins. Any other
        // marker is reported, including one that conflicts with its target.
        if let Some(current) = current {
            let leftover = steps
                .iter()
                .any(|s| s.name == current.name && s.created == current.created);
            if !leftover {
                steps.push(current);
            }
        }
        steps.sort_by_key(|s| s.created);
        Ok(steps)
    }

    fn set_metadata(&self, metadata: &Metadata) -> Result<()> {
        let _lock = self.lock()?;
        self.ensure_dir()?;
        let buf = serde_json::to_vec(metadata).map_err(|source| CheckpointError::Encode {
            context: "session metadata".to_string(),
            source,
        })?;
        let path = self.dir.join(METADATA_FILE);
        write_atomic(&path, &buf).map_err(|e| {
            CheckpointError::io(format!("Failed to write metadata: {}", path.display()), e)
        })
    }

    fn metadata(&self) -> Result<Option<Metadata>> {
        let _lock = self.lock()?;
        let path = self.dir.join(METADATA_FILE);
        let buf = match fs::read(&path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckpointError::io(
                    format!("Failed to read metadata: {}", path.display()),
                    e,
                ))
            }
        };
        serde_json::from_slice(&buf)
            .map(Some)
            .map_err(|e| CheckpointError::Corrupt {
                path,
                details: e.to_string(),
            })
    }

    fn delete(&self, steps: &[&str]) -> Result<()> {
        for step in steps {
            validate_step_name(step)?;
        }
        let _lock = self.lock()?;

        if steps.is_empty() {
            return match fs::remove_dir_all(&self.dir) {
                Ok(()) => {
                    tracing::debug!(session = %self.id, "session deleted");
                    Ok(())
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(CheckpointError::io(
                    format!("Failed to delete session: {}", self.dir.display()),
                    e,
                )),
            };
        }

        for step in steps {
            let path = self.step_path(step);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(session = %self.id, step, "step deleted"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CheckpointError::io(
                        format!("Failed to delete step: {}", path.display()),
                        e,
                    ))
                }
            }
        }
        Ok(())
    }
}
