//! Exportable record of a finished (or aborted) run.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{SimulationStats, Simulator, SimulatorState, Turn};
use crate::agent::Transcript;
use crate::error::Result;

/// Snapshot of a run, written out as JSON by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Unique run identifier
    pub run_id: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Opening message
    pub seed: Turn,
    /// Turns in the order they completed
    pub turns: Vec<Turn>,
    /// Final state of the simulator
    pub state: SimulatorState,
    /// Aborting error, if the run did not complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Shared transcript; every agent holds the same one
    pub transcript: Transcript,
    /// Agent names in speaking order
    pub agents: Vec<String>,
    /// Counters
    pub stats: SimulationStats,
}

impl RunRecord {
    /// Start a record for a run seeded with `seed`
    pub fn new(seed: Turn) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            seed,
            turns: Vec::new(),
            state: SimulatorState::Uninitialized,
            error: None,
            transcript: Transcript::new(),
            agents: Vec::new(),
            stats: SimulationStats::default(),
        }
    }

    /// Append a completed turn
    pub fn push_turn(&mut self, turn: &Turn) {
        self.turns.push(turn.clone());
    }

    /// Copy final state out of the simulator
    pub fn finish(&mut self, sim: &Simulator, error: Option<String>) {
        self.state = sim.state();
        self.error = error;
        self.agents = sim.agents().iter().map(|a| a.identity().to_string()).collect();
        self.transcript = sim
            .agents()
            .first()
            .map(|a| a.transcript().clone())
            .unwrap_or_default();
        self.stats = sim.stats().clone();
    }

    /// Whether the run stopped early
    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty-printed JSON to `path`
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
