//! Text-generation capabilities.
//!
//! Agents never talk to a model directly. Each one holds a shared handle to
//! something implementing [`TextGenerator`] and hands it a [`Prompt`] built
//! from its persona and rendered transcript.
//!
//! ## Implementations
//!
//! | Type                        | Backing                              | Use                  |
//! |-----------------------------|--------------------------------------|----------------------|
//! | [`ChatCompletionsGenerator`]| OpenAI-compatible `/chat/completions`| Real runs            |
//! | [`ScriptedGenerator`]       | FIFO queue of canned replies         | Tests, `--dry-run`   |
//!
//! ## Prompt Layout
//!
//! ```text
//! system: <preamble>
//! user:   Here is the conversation so far.
//!         Moderator: Topic X
//!         Alice: ...
//!         Bob:                      <- cue for the next speaker
//! ```

mod chat;
mod error;
mod scripted;

pub use chat::ChatCompletionsGenerator;
pub use error::GenerationError;
pub use scripted::ScriptedGenerator;

use std::sync::Arc;

use crate::config::{GenerationConfig, Provider};

/// Everything a generator needs to produce one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Identity of the agent that is about to speak
    pub speaker: String,
    /// Persona / instruction block, sent as the system message
    pub preamble: String,
    /// Rendered transcript including the trailing speaker cue
    pub history: String,
}

/// Capability that turns a prompt into a reply.
///
/// Calls block until the reply is available. Implementations must not retry
/// on their own; failures go straight back to the caller.
pub trait TextGenerator: Send + Sync {
    /// Produce the raw reply text for `prompt`
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError>;

    /// Short label used in logs
    fn name(&self) -> &str;
}

/// Build the generator selected by `config`.
///
/// `dry_run` forces the scripted generator regardless of the configured
/// provider, so a scenario can be exercised without network access.
pub fn from_config(
    config: &GenerationConfig,
    dry_run: bool,
) -> crate::Result<Arc<dyn TextGenerator>> {
    if dry_run || config.provider == Provider::Scripted {
        return Ok(Arc::new(ScriptedGenerator::echo()));
    }

    let generator = ChatCompletionsGenerator::from_config(config)?;
    Ok(Arc::new(generator))
}
