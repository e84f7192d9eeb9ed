//! Append-only conversation record kept by each agent.

use serde::{Deserialize, Serialize};

/// Header line that opens every rendered history
pub const HISTORY_HEADER: &str = "Here is the conversation so far.";

/// One utterance as seen by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Identity of whoever said it
    pub speaker: String,
    /// What was said
    pub text: String,
}

impl TranscriptEntry {
    /// Create a new entry
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// Ordered, append-only list of entries.
///
/// Entries cannot be removed or edited once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in arrival order
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Render as the text block handed to a generator, ending with a cue
    /// line for `next_speaker`.
    pub fn render(&self, next_speaker: &str) -> String {
        let mut out = String::from(HISTORY_HEADER);
        for entry in &self.entries {
            out.push('\n');
            out.push_str(&entry.to_string());
        }
        out.push_str(&format!("\n{next_speaker}:"));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let transcript = Transcript::new();
        assert_eq!(transcript.render("B"), "Here is the conversation so far.\nB:");
    }

    #[test]
    fn test_render_entries_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::new("Moderator", "Topic X"));
        transcript.push(TranscriptEntry::new("B", "I think so."));

        assert_eq!(
            transcript.render("C"),
            "Here is the conversation so far.\nModerator: Topic X\nB: I think so.\nC:"
        );
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().speaker, "B");
    }

    #[test]
    fn test_serializes_as_list() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::new("A", "hi"));
        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(json, serde_json::json!([{"speaker": "A", "text": "hi"}]));
    }
}
