//! Configuration management.
//!
//! Supports configuration from:
//! - TOML scenario files
//! - Environment variables
//! - CLI arguments (for the `dialogue` binary)
//!
//! ```toml
//! [scenario]
//! rounds = 4
//! opener = { name = "Moderator", message = "Should cities ban cars?" }
//!
//! [[scenario.agents]]
//! name = "Urbanist"
//! preamble = "You argue for walkable cities."
//!
//! [generation]
//! provider = "openrouter"
//! model = "meta-llama/llama-3.2-3b-instruct:free"
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DialogueError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Who talks, about what, for how long
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Text-generation backend
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DialogueError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default scenario location (`<config dir>/dialogue/scenario.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dialogue").join("scenario.toml"))
    }

    /// Apply `DIALOGUE_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup("DIALOGUE_MODEL") {
            self.generation.model = model;
        }
        if let Some(base_url) = lookup("DIALOGUE_BASE_URL") {
            self.generation.base_url = base_url;
        }
        if let Some(rounds) = lookup("DIALOGUE_ROUNDS") {
            if let Ok(rounds) = rounds.parse() {
                self.scenario.rounds = rounds;
            }
        }
        self
    }

    /// Check the whole configuration before a run
    pub fn validate(&self) -> Result<()> {
        self.scenario.validate()?;
        self.generation.validate()
    }
}

/// Scenario definition: roster, opener and round count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Turns to run after the opening message. Signed so that a negative
    /// value in a file is reported instead of failing to parse.
    pub rounds: i64,

    /// Seed message delivered to every agent before the first turn
    pub opener: OpenerConfig,

    /// Agents in speaking order
    pub agents: Vec<AgentConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rounds: 6,
            opener: OpenerConfig::default(),
            agents: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Round count as an unsigned value
    pub fn num_rounds(&self) -> Result<usize> {
        usize::try_from(self.rounds).map_err(|_| {
            DialogueError::Config(format!("rounds must be >= 0, got {}", self.rounds))
        })
    }

    /// Check round count and roster
    pub fn validate(&self) -> Result<()> {
        self.num_rounds()?;

        if self.agents.is_empty() {
            return Err(DialogueError::Config(
                "scenario has no agents".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(DialogueError::Config("agent name cannot be empty".to_string()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(DialogueError::Config(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
        }

        Ok(())
    }
}

/// Opening message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenerConfig {
    /// Speaker tag for the seed message
    pub name: String,
    /// Seed text
    pub message: String,
}

impl Default for OpenerConfig {
    fn default() -> Self {
        Self {
            name: "Moderator".to_string(),
            message: "Introduce yourselves and state your position.".to_string(),
        }
    }
}

/// One participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique display name, also the transcript speaker tag
    pub name: String,
    /// Persona / instructions sent as the system message
    pub preamble: String,
}

/// Generation backend selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-compatible chat completions (OpenRouter by default)
    #[default]
    OpenRouter,
    /// Deterministic offline replies
    Scripted,
}

/// Text-generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Backend to use
    pub provider: Provider,

    /// API base URL; `/chat/completions` is appended
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Reply length cap
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenRouter,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "meta-llama/llama-3.2-3b-instruct:free".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            timeout_secs: 60,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Full chat-completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Check numeric ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DialogueError::Config(format!(
                "temperature {} not in [0.0, 2.0]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(DialogueError::Config("max_tokens must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        [scenario]
        rounds = 3
        opener = { name = "Moderator", message = "Topic X" }

        [[scenario.agents]]
        name = "A"
        preamble = "You are A."

        [[scenario.agents]]
        name = "B"
        preamble = "You are B."

        [generation]
        provider = "scripted"
        temperature = 0.2
    "#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scenario.rounds, 6);
        assert_eq!(config.generation.provider, Provider::OpenRouter);
        assert_eq!(
            config.generation.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_scenario_with_only_agents() {
        let config = Config::from_toml(
            r#"
[[scenario.agents]]
name = "A"
preamble = "You are A."
"#,
        )
        .unwrap();
        assert_eq!(config.scenario.rounds, 6);
        assert_eq!(config.scenario.opener.name, "Moderator");
        assert_eq!(config.scenario.agents.len(), 1);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Config::from_toml("[scenario\nrounds = 1").unwrap_err();
        assert!(matches!(err, DialogueError::Config(ref msg) if msg.starts_with("Failed to parse config")));
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml(SCENARIO).unwrap();
        assert_eq!(config.scenario.num_rounds().unwrap(), 3);
        assert_eq!(config.scenario.opener.message, "Topic X");
        assert_eq!(config.scenario.agents.len(), 2);
        assert_eq!(config.generation.provider, Provider::Scripted);
        // unspecified generation fields fall back to defaults
        assert_eq!(config.generation.max_tokens, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_rounds_rejected() {
        let mut config = Config::from_toml(SCENARIO).unwrap();
        config.scenario.rounds = -1;
        assert!(matches!(config.validate(), Err(DialogueError::Config(_))));
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let mut config = Config::from_toml(SCENARIO).unwrap();
        config.scenario.agents[1].name = "A".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate agent name: A"));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_toml(SCENARIO).unwrap().with_overrides(|key| match key {
            "DIALOGUE_MODEL" => Some("openai/gpt-4o-mini".to_string()),
            "DIALOGUE_ROUNDS" => Some("10".to_string()),
            _ => None,
        });
        assert_eq!(config.generation.model, "openai/gpt-4o-mini");
        assert_eq!(config.scenario.rounds, 10);
        assert_eq!(config.generation.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = GenerationConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
