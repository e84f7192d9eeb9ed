//! OpenAI-compatible chat-completions generator.
//!
//! Works against OpenRouter out of the box and against any endpoint that
//! speaks the same JSON (`/v1/chat/completions`). The HTTP client is async;
//! each call is driven to completion on a private current-thread runtime so
//! the simulator itself stays synchronous.
//!
//! Must not be called from inside another tokio runtime.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationError, Prompt, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::DialogueError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

/// [`TextGenerator`] backed by an OpenAI-compatible HTTP API.
pub struct ChatCompletionsGenerator {
    client: Client,
    runtime: tokio::runtime::Runtime,
    config: GenerationConfig,
    api_key: Option<String>,
}

impl ChatCompletionsGenerator {
    /// Create a generator, reading the API key from `config.api_key_env`
    pub fn from_config(config: &GenerationConfig) -> crate::Result<Self> {
        let api_key = config.api_key();
        Self::with_api_key(config, api_key)
    }

    /// Create a generator with an explicit API key (`None` makes every call
    /// fail with [`GenerationError::Unavailable`])
    pub fn with_api_key(
        config: &GenerationConfig,
        api_key: Option<String>,
    ) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DialogueError::Config(format!("Failed to create HTTP client: {e}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            runtime,
            config: config.clone(),
            api_key,
        })
    }

    async fn complete(&self, api_key: &str, prompt: &Prompt) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::new("system", &prompt.preamble),
                ChatMessage::new("user", &prompt.history),
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .header("X-Title", "Dialogue Simulator")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parse_chat_response(&body)
    }
}

impl TextGenerator for ChatCompletionsGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Unavailable(format!("{} not set", self.config.api_key_env))
        })?;

        tracing::debug!(model = %self.config.model, speaker = %prompt.speaker, "chat completion request");
        self.runtime.block_on(self.complete(api_key, prompt))
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for ChatCompletionsGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsGenerator")
            .field("endpoint", &self.config.endpoint())
            .field("model", &self.config.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Extract the reply text from a chat-completions response body.
fn parse_chat_response(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)?;

    if let Some(usage) = &response.usage {
        tracing::trace!(total_tokens = usage.total_tokens, "chat completion usage");
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".to_string()))?;

    choice.message.content.ok_or_else(|| {
        GenerationError::MalformedResponse("first choice has no content".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            speaker: "B".to_string(),
            preamble: "You are B.".to_string(),
            history: "Here is the conversation so far.\nModerator: Topic X\nB:".to_string(),
        }
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{
            "id": "gen-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "I agree."}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
        }"#;
        assert_eq!(parse_chat_response(body).unwrap(), "I agree.");
    }

    #[test]
    fn test_parse_empty_choices() {
        let err = parse_chat_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(ref msg) if msg.contains("no choices")));
    }

    #[test]
    fn test_parse_null_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let err = parse_chat_response(body).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(ref msg) if msg.contains("no content")));
    }

    #[test]
    fn test_parse_not_json() {
        let err = parse_chat_response("<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![
                ChatMessage::new("system", "You are B."),
                ChatMessage::new("user", "Here is the conversation so far.\nB:"),
            ],
            temperature: Some(0.5),
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Here is the conversation so far.\nB:");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let config = GenerationConfig {
            api_key_env: "DIALOGUE_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let generator = ChatCompletionsGenerator::with_api_key(&config, None).unwrap();
        let err = generator.generate(&prompt()).unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(ref msg) if msg.contains("DIALOGUE_TEST_UNSET_KEY")));
    }
}
