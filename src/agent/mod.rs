//! Dialogue agents.
//!
//! An agent is a name, a persona preamble that never changes, a private
//! [`Transcript`] and a shared handle to a [`TextGenerator`].
//!
//! Agents only ever learn about the conversation through [`Agent::receive`];
//! the simulator calls it for every utterance, including the agent's own.
//! [`Agent::produce_reply`] reads the transcript but does not write to it,
//! so a reply is recorded exactly once, when it is broadcast back.

mod transcript;

pub use transcript::{Transcript, TranscriptEntry, HISTORY_HEADER};

use std::sync::Arc;

use crate::error::Result;
use crate::generation::{Prompt, TextGenerator};

/// A participant in the dialogue
pub struct Agent {
    identity: String,
    preamble: String,
    transcript: Transcript,
    generator: Arc<dyn TextGenerator>,
}

impl Agent {
    /// Create an agent with an empty transcript
    pub fn new(
        identity: impl Into<String>,
        preamble: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            identity: identity.into(),
            preamble: preamble.into(),
            transcript: Transcript::new(),
            generator,
        }
    }

    /// Unique name, also used as speaker tag
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Persona preamble
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Everything this agent has observed
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record an utterance
    pub fn receive(&mut self, speaker: &str, text: &str) {
        self.transcript.push(TranscriptEntry::new(speaker, text));
    }

    /// Rendered history with this agent cued as the next speaker
    pub fn render_history(&self) -> String {
        self.transcript.render(&self.identity)
    }

    /// Build the prompt for this agent's next turn
    pub fn prompt(&self) -> Prompt {
        Prompt {
            speaker: self.identity.clone(),
            preamble: self.preamble.clone(),
            history: self.render_history(),
        }
    }

    /// Ask the generator for this agent's next utterance.
    ///
    /// Leaves the transcript untouched; the caller broadcasts the reply.
    pub fn produce_reply(&self) -> Result<String> {
        let reply = self.generator.generate(&self.prompt())?;
        Ok(reply)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("identity", &self.identity)
            .field("transcript_len", &self.transcript.len())
            .field("generator", &self.generator.name())
            .finish()
    }
}
