use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the playback engine.
///
/// Malformed user text never reaches the caller as an error; the engine drops
/// it and leaves the edited value unchanged. `UserInput` exists so lower
/// layers can report the rejection before that happens.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: '{0}'")]
    UserInput(String),

    #[error("Error opening log '{identity}': {reason}")]
    SourceOpen { identity: String, reason: String },

    #[error("Video '{video}' could not be loaded: {reason}")]
    UnsupportedMedia { video: String, reason: String },

    #[error("Preference store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
