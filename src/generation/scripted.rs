//! Deterministic generator that never touches the network.
//!
//! Queue canned replies (or errors) and they are handed out in FIFO order,
//! one per call, regardless of which agent asks. Once the queue is empty the
//! generator either fails with [`GenerationError::Exhausted`] or, in echo
//! mode, answers with `"<speaker> (turn N)"`.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{GenerationError, Prompt, TextGenerator};

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Result<String, GenerationError>>,
    prompts: Vec<Prompt>,
}

/// Scripted [`TextGenerator`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<Script>,
    echo: bool,
}

impl ScriptedGenerator {
    /// Empty script; every call fails once the queue runs out
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that answers every call with `"<speaker> (turn N)"`
    pub fn echo() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            echo: true,
        }
    }

    /// Queue a reply
    pub fn enqueue_reply(&self, reply: impl Into<String>) {
        self.lock().queue.push_back(Ok(reply.into()));
    }

    /// Queue a reply and return the generator for chaining
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.enqueue_reply(reply);
        self
    }

    /// Queue a failure
    pub fn enqueue_error(&self, error: GenerationError) {
        self.lock().queue.push_back(Err(error));
    }

    /// Queue a failure and return the generator for chaining
    pub fn with_error(self, error: GenerationError) -> Self {
        self.enqueue_error(error);
        self
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<Prompt> {
        self.lock().prompts.clone()
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.lock().prompts.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panic while holding the lock cannot leave the queue half-updated.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let mut script = self.lock();
        script.prompts.push(prompt.clone());
        let call = script.prompts.len();

        match script.queue.pop_front() {
            Some(next) => next,
            None if self.echo => Ok(format!("{} (turn {})", prompt.speaker, call)),
            None => Err(GenerationError::Exhausted(prompt.speaker.clone())),
        }
    }

    fn name(&self) -> &str {
        if self.echo {
            "echo"
        } else {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(speaker: &str) -> Prompt {
        Prompt {
            speaker: speaker.to_string(),
            preamble: "You are terse.".to_string(),
            history: format!("Here is the conversation so far.\n{speaker}:"),
        }
    }

    #[test]
    fn test_replies_in_fifo_order() {
        let generator = ScriptedGenerator::new()
            .with_reply("first")
            .with_reply("second");

        assert_eq!(generator.generate(&prompt("A")).unwrap(), "first");
        assert_eq!(generator.generate(&prompt("B")).unwrap(), "second");
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn test_exhausted_without_echo() {
        let generator = ScriptedGenerator::new();
        let err = generator.generate(&prompt("A")).unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted(ref who) if who == "A"));
    }

    #[test]
    fn test_queued_error_is_returned() {
        let generator = ScriptedGenerator::new()
            .with_error(GenerationError::Network("connection reset".to_string()))
            .with_reply("after");

        assert!(generator.generate(&prompt("A")).is_err());
        assert_eq!(generator.generate(&prompt("A")).unwrap(), "after");
    }

    #[test]
    fn test_echo_counts_calls() {
        let generator = ScriptedGenerator::echo();
        assert_eq!(generator.generate(&prompt("A")).unwrap(), "A (turn 1)");
        assert_eq!(generator.generate(&prompt("B")).unwrap(), "B (turn 2)");
        assert_eq!(generator.name(), "echo");
    }

    #[test]
    fn test_prompts_are_recorded() {
        let generator = ScriptedGenerator::echo();
        generator.generate(&prompt("Bob")).unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].speaker, "Bob");
        assert!(prompts[0].history.ends_with("Bob:"));
    }
}
