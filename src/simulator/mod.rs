//! Round-robin dialogue simulator.
//!
//! Drives a fixed roster of [`Agent`]s through a bounded number of turns and
//! keeps every agent's transcript identical.
//!
//! ## Turn Protocol
//!
//! ```text
//! reset(opener, text)        every agent receives (opener, text)
//!
//! step():
//!   idx     = (turn_index + 1) % agents.len()
//!   reply   = agents[idx].produce_reply()        may fail: nothing below runs
//!   for a in agents: a.receive(speaker, reply)   speaker included
//!   turn_index += 1
//! ```
//!
//! ## State Machine
//!
//! ```text
//!                  reset()               step()
//!  [Uninitialized] ───────> [Ready] ───────────> [Running] ──┐
//!                              │                    │   ^    │ step()
//!                              │ limit == 0         │   └────┘
//!                              v                    │ turn_index == limit
//!                           [Done] <────────────────┘
//! ```
//!
//! | State           | `reset`        | `step`          |
//! |-----------------|----------------|-----------------|
//! | `Uninitialized` | → Ready / Done | InvalidState    |
//! | `Ready`         | InvalidState   | → Running / Done|
//! | `Running`       | InvalidState   | → Running / Done|
//! | `Done`          | InvalidState   | InvalidState    |
//!
//! Without a round limit the simulator never reaches `Done` and `step` can be
//! called indefinitely; [`Simulator::run`] always sets one.

mod record;
mod stats;

pub use record::RunRecord;
pub use stats::SimulationStats;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::{DialogueError, Result};

/// Simulator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulatorState {
    /// Built, seed not yet delivered
    Uninitialized,
    /// Seed delivered, no turn taken
    Ready,
    /// At least one turn taken, more allowed
    Running,
    /// Round limit reached
    Done,
}

/// One completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based turn number; 0 for the seed message
    pub index: usize,
    /// Who spoke
    pub speaker: String,
    /// What was said
    pub text: String,
}

impl Turn {
    /// The opening message, reported like a turn
    pub fn seed(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: 0,
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// Whether this is the opening message
    pub fn is_seed(&self) -> bool {
        self.index == 0
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}): {}", self.speaker, self.text)
    }
}

/// Round-robin dialogue simulator
#[derive(Debug)]
pub struct Simulator {
    agents: Vec<Agent>,
    turn_index: usize,
    state: SimulatorState,
    round_limit: Option<usize>,
    stats: SimulationStats,
}

impl Simulator {
    /// Create a simulator over `agents`, in speaking order.
    ///
    /// Identities must be unique. An empty roster is accepted here and
    /// rejected when a speaker is first selected.
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.identity()) {
                return Err(DialogueError::Config(format!(
                    "duplicate agent identity: {}",
                    agent.identity()
                )));
            }
        }

        Ok(Self {
            agents,
            turn_index: 0,
            state: SimulatorState::Uninitialized,
            round_limit: None,
            stats: SimulationStats::default(),
        })
    }

    /// Move to `Done` once `rounds` turns have completed.
    ///
    /// A limit at or below the turns already taken ends the run immediately.
    pub fn with_round_limit(mut self, rounds: usize) -> Self {
        self.round_limit = Some(rounds);
        if self.state != SimulatorState::Uninitialized && self.limit_reached() {
            self.state = SimulatorState::Done;
        }
        self
    }

    /// Agents in speaking order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent by identity
    pub fn agent(&self, identity: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.identity() == identity)
    }

    /// Completed turns since the seed
    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Current lifecycle state
    pub fn state(&self) -> SimulatorState {
        self.state
    }

    /// Configured round limit
    pub fn round_limit(&self) -> Option<usize> {
        self.round_limit
    }

    fn limit_reached(&self) -> bool {
        self.round_limit.is_some_and(|limit| self.turn_index >= limit)
    }

    /// Whether the round limit has been reached
    pub fn is_done(&self) -> bool {
        self.state == SimulatorState::Done
    }

    /// Counters for this run
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Whether every agent holds the same transcript
    pub fn is_consistent(&self) -> bool {
        self.agents
            .windows(2)
            .all(|pair| pair[0].transcript() == pair[1].transcript())
    }

    /// Deliver the opening message to every agent, in order
    pub fn reset(&mut self, opener: &str, text: &str) -> Result<()> {
        if self.state != SimulatorState::Uninitialized {
            return Err(DialogueError::InvalidState(format!(
                "Cannot reset in state {:?}",
                self.state
            )));
        }

        for agent in &mut self.agents {
            agent.receive(opener, text);
        }
        tracing::debug!(opener, agents = self.agents.len(), "seed delivered");

        self.state = if self.limit_reached() {
            SimulatorState::Done
        } else {
            SimulatorState::Ready
        };
        Ok(())
    }

    /// Index of the agent that speaks after `turn_index` completed turns
    pub fn select_next_speaker(&self, turn_index: usize) -> Result<usize> {
        if self.agents.is_empty() {
            return Err(DialogueError::InvalidState(
                "Cannot select a speaker with no agents".to_string(),
            ));
        }
        let n = self.agents.len();
        Ok((turn_index % n + 1) % n)
    }

    /// Run one turn: pick the speaker, generate, broadcast to everyone.
    ///
    /// If generation fails no agent receives anything and the turn counter
    /// does not move.
    pub fn step(&mut self) -> Result<Turn> {
        match self.state {
            SimulatorState::Uninitialized => {
                return Err(DialogueError::InvalidState(
                    "step called before reset".to_string(),
                ));
            },
            SimulatorState::Ready | SimulatorState::Running if !self.limit_reached() => {},
            SimulatorState::Ready | SimulatorState::Running | SimulatorState::Done => {
                return Err(DialogueError::InvalidState(format!(
                    "step called after final round ({} turns)",
                    self.turn_index
                )));
            },
        }

        let idx = self.select_next_speaker(self.turn_index)?;
        let speaker = &self.agents[idx];

        let reply = match speaker.produce_reply() {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    turn = self.turn_index + 1,
                    speaker = speaker.identity(),
                    "generation failed: {e}"
                );
                self.stats.record_failure();
                return Err(e);
            },
        };
        let identity = speaker.identity().to_string();

        for agent in &mut self.agents {
            agent.receive(&identity, &reply);
        }

        self.turn_index += 1;
        self.stats.record_turn(&identity, &reply);
        self.state = if self.limit_reached() {
            SimulatorState::Done
        } else {
            SimulatorState::Running
        };

        tracing::info!(
            turn = self.turn_index,
            speaker = %identity,
            chars = reply.chars().count(),
            "turn complete"
        );

        Ok(Turn {
            index: self.turn_index,
            speaker: identity,
            text: reply,
        })
    }

    /// Seed the conversation, then take exactly `num_rounds` turns, handing
    /// each one to `on_turn` as soon as it completes.
    ///
    /// The first failure stops the loop and is returned; turns already
    /// reported stay valid. If the seed cannot be delivered the simulator,
    /// round limit included, is left as it was.
    pub fn run_with<F>(
        &mut self,
        num_rounds: usize,
        opener: &str,
        text: &str,
        mut on_turn: F,
    ) -> Result<()>
    where
        F: FnMut(&Turn),
    {
        let previous = self.round_limit.replace(num_rounds);
        if let Err(e) = self.reset(opener, text) {
            self.round_limit = previous;
            return Err(e);
        }

        for _ in 0..num_rounds {
            let turn = self.step()?;
            on_turn(&turn);
        }

        Ok(())
    }

    /// Same as [`Simulator::run_with`], collecting the turns
    pub fn run(&mut self, num_rounds: usize, opener: &str, text: &str) -> Result<Vec<Turn>> {
        let mut turns = Vec::with_capacity(num_rounds);
        self.run_with(num_rounds, opener, text, |turn| turns.push(turn.clone()))?;
        Ok(turns)
    }
}
