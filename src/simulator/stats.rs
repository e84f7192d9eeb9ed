//! Per-run counters.

use std::collections::BTreeMap;

use serde::Serialize;

/// Running totals for one simulation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationStats {
    /// Completed turns
    pub turns: usize,
    /// Completed turns by speaker
    pub turns_by_speaker: BTreeMap<String, usize>,
    /// Characters generated across all turns
    pub chars_generated: usize,
    /// Failed generation calls (at most one per run, since a failure ends it)
    pub generation_failures: usize,
}

impl SimulationStats {
    /// Record a completed turn
    pub fn record_turn(&mut self, speaker: &str, text: &str) {
        self.turns += 1;
        *self.turns_by_speaker.entry(speaker.to_string()).or_insert(0) += 1;
        self.chars_generated += text.chars().count();
    }

    /// Record a failed generation call
    pub fn record_failure(&mut self) {
        self.generation_failures += 1;
    }

    /// Mean reply length in characters
    pub fn avg_reply_chars(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.chars_generated as f64 / self.turns as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_turns() {
        let mut stats = SimulationStats::default();
        stats.record_turn("B", "abcd");
        stats.record_turn("C", "ab");
        stats.record_turn("B", "");

        assert_eq!(stats.turns, 3);
        assert_eq!(stats.turns_by_speaker["B"], 2);
        assert_eq!(stats.chars_generated, 6);
        assert!((stats.avg_reply_chars() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_average() {
        assert_eq!(SimulationStats::default().avg_reply_chars(), 0.0);
    }
}
