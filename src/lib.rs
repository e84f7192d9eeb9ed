//! # Dialogue - Turn-Based Multi-Agent Conversation
//!
//! Runs a scripted conversation between LLM-backed agents: a fixed roster
//! takes turns in strict round-robin, every utterance is broadcast to every
//! agent, and the run stops after a fixed number of turns.
//!
//! ## Features
//!
//! - **Private transcripts**: each agent keeps its own append-only record,
//!   rendered to text only when it is asked to speak
//! - **Total, ordered broadcast**: all agents (speaker included) see every
//!   utterance in the same order
//! - **Atomic turns**: a failed generation call leaves every transcript as it was
//! - **Pluggable generation**: OpenAI-compatible HTTP backend or deterministic
//!   scripted replies
//!
//! ## Turn Order
//!
//! Speaker selection is offset by one, so the agent at position 0 is usually
//! the one that shares a slot with the opener and speaks last:
//!
//! ```text
//! agents = [A, B, C]      reset(Moderator, "Topic X")
//!
//! turn 1  idx (0+1)%3 = 1  B
//! turn 2  idx (1+1)%3 = 2  C
//! turn 3  idx (2+1)%3 = 0  A
//! turn 4  idx (3+1)%3 = 1  B
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dialogue::{Agent, ScriptedGenerator, Simulator, TextGenerator};
//!
//! let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::echo());
//! let agents = vec![
//!     Agent::new("A", "You are A.", generator.clone()),
//!     Agent::new("B", "You are B.", generator.clone()),
//!     Agent::new("C", "You are C.", generator),
//! ];
//!
//! let mut sim = Simulator::new(agents).unwrap();
//! let turns = sim.run(2, "Moderator", "Topic X").unwrap();
//!
//! assert_eq!(turns[0].speaker, "B");
//! assert_eq!(turns[1].speaker, "C");
//! assert!(sim.agents().iter().all(|a| a.transcript().len() == 3));
//! ```
//!
//! ## Modules
//!
//! - [`agent`]: agents and their transcripts
//! - [`simulator`]: turn scheduling, broadcast, run records
//! - [`generation`]: the text-generation capability and its backends
//! - [`config`]: scenario files and environment overrides
//! - [`error`]: error types and result aliases

pub mod agent;
pub mod config;
pub mod error;
pub mod generation;
pub mod simulator;

// Re-exports for convenience
pub use agent::{Agent, Transcript, TranscriptEntry};
pub use config::{Config, GenerationConfig, ScenarioConfig};
pub use error::{DialogueError, Result};
pub use generation::{
    ChatCompletionsGenerator, GenerationError, Prompt, ScriptedGenerator, TextGenerator,
};
pub use simulator::{RunRecord, SimulationStats, Simulator, SimulatorState, Turn};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the agent roster described by `scenario`, all sharing `generator`
pub fn build_agents(scenario: &ScenarioConfig, generator: &Arc<dyn TextGenerator>) -> Vec<Agent> {
    scenario
        .agents
        .iter()
        .map(|agent| Agent::new(&agent.name, &agent.preamble, Arc::clone(generator)))
        .collect()
}
