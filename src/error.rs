//! Dialogue simulation error types.
//!
//! # Epistemic Error Classification
//!
//! - **B_i falsified**: the caller's belief about the simulator was wrong
//!   (stepping before `reset`, duplicate agent names, a negative round count).
//! - **I^B materialized**: the text-generation capability failed at runtime.
//!   These are wrapped as [`DialogueError::Generation`] and keep the full
//!   chain via `#[source]`.
//!
//! No variant is recovered from inside the crate: a failed turn aborts and
//! surfaces to whoever drives the simulator.

use thiserror::Error;

use crate::generation::GenerationError;

/// Dialogue simulation errors.
#[derive(Error, Debug)]
pub enum DialogueError {
    /// The simulator was driven out of order (step before reset, step after
    /// the final round, reset twice) or has no agents to pick from.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The text-generation capability failed; propagated unchanged.
    #[error("Generation failed: {0}")]
    Generation(#[source] GenerationError),

    /// Scenario or roster is not usable.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dialogue operations
pub type Result<T> = std::result::Result<T, DialogueError>;

impl DialogueError {
    /// Whether this error came from the text-generation capability
    pub fn is_generation(&self) -> bool {
        matches!(self, DialogueError::Generation(_))
    }
}

impl From<GenerationError> for DialogueError {
    fn from(err: GenerationError) -> Self {
        DialogueError::Generation(err)
    }
}

impl From<toml::de::Error> for DialogueError {
    fn from(err: toml::de::Error) -> Self {
        DialogueError::Config(format!("Failed to parse config: {err}"))
    }
}
