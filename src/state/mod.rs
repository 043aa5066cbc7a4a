//! Checkpoint state: sessions made of linearly ordered, named steps.
//!
//! A [`Manager`] maps a stable session ID to a [`Session`]; the session
//! answers, for each requested step, whether that step was already completed
//! by an earlier run. Requesting a step implicitly completes the step that
//! was in progress before it.

pub mod directory;
pub mod record;

use sha2::{Digest, Sha256};

use crate::error::Result;

pub use directory::{DirectoryManager, DirectorySession};
pub use record::StepRecord;

/// Free-form document attached to a session.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Compute a stable session ID from an ordered list of inputs.
///
/// Each input is digested on its own and the concatenated digests are
/// digested again, so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn session_id<I, S>(inputs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(Sha256::digest(input.as_ref().as_bytes()));
    }
    hex::encode(hasher.finalize())
}

/// Creates, opens and enumerates sessions.
pub trait Manager {
    /// See [`session_id`].
    fn session_id(&self, inputs: &[&str]) -> String {
        session_id(inputs)
    }

    /// Open the session `id`, creating it when needed.
    ///
    /// With `reset` set, the in-progress marker is cleared so that a fresh
    /// run starts a new current step; completed steps and metadata are kept.
    fn use_session(&self, id: &str, reset: bool) -> Result<Box<dyn Session>>;

    /// Open an existing session without creating it.
    fn open_session(&self, id: &str) -> Result<Box<dyn Session>>;

    /// IDs of all existing sessions, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// A series of steps that may be independently tested for completion.
pub trait Session {
    fn id(&self) -> &str;

    /// Report whether `name` has been completed, marking it as in progress
    /// when it has not.
    ///
    /// The step that was in progress, if any, is completed first unless it is
    /// `name` itself. An empty `name` only completes the current step and
    /// returns `true`.
    ///
    /// Completing the current step fails with a conflict when its permanent
    /// record already exists, which means the step name was reused within a
    /// run (or two runs share a session ID). Having no current step is not an
    /// error.
    fn step(&self, name: &str) -> Result<bool>;

    /// Completed steps followed by the current one, ordered by creation time.
    fn steps(&self) -> Result<Vec<StepRecord>>;

    fn set_metadata(&self, metadata: &Metadata) -> Result<()>;

    /// `None` when no metadata has been set.
    fn metadata(&self) -> Result<Option<Metadata>>;

    /// Delete the named steps, or the whole session when `steps` is empty.
    fn delete(&self, steps: &[&str]) -> Result<()>;
}
