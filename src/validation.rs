//! Validation of session IDs and step names.
//!
//! Both end up as file names inside the state directory, so anything that
//! could escape the directory or collide with the reserved `.`-prefixed
//! bookkeeping files is rejected before it reaches the filesystem.

use crate::error::{CheckpointError, Result};

/// Maximum length of a step name (a single path component).
pub const MAX_NAME_LENGTH: usize = 255;

/// Suffix of the lock file kept next to each session directory.
pub const SESSION_LOCK_SUFFIX: &str = ".lock";

/// Maximum length of a session ID; `<id>.lock` must still fit in a path
/// component.
pub const MAX_SESSION_ID_LENGTH: usize = MAX_NAME_LENGTH - SESSION_LOCK_SUFFIX.len();

/// Validates that a session ID can be used as a directory name.
///
/// ```
/// use checkpoint::validation::validate_session_id;
///
/// assert!(validate_session_id("e3b0c44298fc1c14").is_ok());
/// assert!(validate_session_id("").is_err());
/// assert!(validate_session_id("../etc").is_err());
/// ```
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CheckpointError::InvalidArgument(
            "empty session id".to_string(),
        ));
    }
    validate_component("session id", id, MAX_SESSION_ID_LENGTH)
}

/// Validates that a step name can be used as a record file name.
///
/// The empty name is rejected here; callers that accept it as "finalize the
/// current step" check for it before validating.
pub fn validate_step_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CheckpointError::InvalidArgument(
            "empty step name".to_string(),
        ));
    }
    validate_component("step name", name, MAX_NAME_LENGTH)
}

fn validate_component(what: &str, value: &str, max_len: usize) -> Result<()> {
    if value.len() > max_len {
        return Err(CheckpointError::InvalidArgument(format!(
            "{what} too long: {} bytes (max {max_len})",
            value.len()
        )));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(CheckpointError::InvalidArgument(format!(
            "{what} '{value}' contains a path separator or NUL"
        )));
    }
    // Covers "." and ".." as well as the reserved bookkeeping files.
    if value.starts_with('.') {
        return Err(CheckpointError::InvalidArgument(format!(
            "{what} '{value}' may not start with '.'"
        )));
    }
    Ok(())
}

/// Clap value parser for step name arguments.
pub fn clap_step_validator(s: &str) -> std::result::Result<String, String> {
    validate_step_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_validate_step_name_valid() {
        assert!(validate_step_name("a").is_ok());
        assert!(validate_step_name("build-image").is_ok());
        assert!(validate_step_name("step 2: deploy").is_ok());
        assert!(validate_step_name("v1.2.3").is_ok());
    }

    #[test]
    fn test_validate_step_name_rejects_paths() {
        assert!(validate_step_name("a/b").is_err());
        assert!(validate_step_name("..").is_err());
        assert!(validate_step_name(".").is_err());
        assert!(validate_step_name("a\\b").is_err());
    }

    #[test]
    fn test_validate_step_name_rejects_reserved() {
        let err = validate_step_name(".in-progress").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(validate_step_name(".metadata").is_err());
    }

    #[test]
    fn test_validate_session_id_empty() {
        let err = validate_session_id("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("empty session id"));
    }

    #[test]
    fn test_validate_too_long() {
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_step_name(&long).is_err());
        assert!(validate_session_id(&long).is_err());
        assert!(validate_step_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_session_id_leaves_room_for_lock_suffix() {
        assert_eq!(MAX_SESSION_ID_LENGTH, 250);
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LENGTH)).is_ok());

        let err = validate_session_id(&"a".repeat(MAX_SESSION_ID_LENGTH + 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_clap_step_validator() {
        assert!(clap_step_validator("deploy").is_ok());
        assert!(clap_step_validator("../deploy").is_err());
    }
}
