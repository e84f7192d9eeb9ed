//! Integration tests with real OpenRouter inference.
//!
//! Ignored by default. Run with:
//!
//! ```bash
//! OPENROUTER_API_KEY=sk-or-... cargo test --test integration_openrouter -- --ignored
//! ```

use std::sync::Arc;
use std::time::Instant;

use dialogue::{
    Agent, ChatCompletionsGenerator, GenerationConfig, GenerationError, Simulator, TextGenerator,
};

fn live_config() -> GenerationConfig {
    dotenvy::dotenv().ok();
    GenerationConfig {
        max_tokens: 80,
        ..Default::default()
    }
}

/// Two agents, three turns against a free model
#[test]
#[ignore = "requires OPENROUTER_API_KEY and network access"]
fn test_live_three_turn_dialogue() {
    let config = live_config();
    let generator: Arc<dyn TextGenerator> =
        Arc::new(ChatCompletionsGenerator::from_config(&config).unwrap());

    let agents = vec![
        Agent::new(
            "Optimist",
            "You believe technology mostly improves lives. Answer in one sentence.",
            Arc::clone(&generator),
        ),
        Agent::new(
            "Skeptic",
            "You question claims and ask for evidence. Answer in one sentence.",
            Arc::clone(&generator),
        ),
    ];
    let mut sim = Simulator::new(agents).unwrap();

    let start = Instant::now();
    let turns = sim
        .run(3, "Moderator", "Is remote work good for cities?")
        .unwrap();
    println!("3 turns in {:.1}s", start.elapsed().as_secs_f64());

    for turn in &turns {
        println!("{turn}");
        assert!(!turn.text.trim().is_empty());
    }
    assert_eq!(turns[0].speaker, "Skeptic");
    assert_eq!(turns[1].speaker, "Optimist");
    assert!(sim.is_consistent());
}

/// A bad key comes back as an upstream error, not a panic
#[test]
#[ignore = "requires network access"]
fn test_live_bad_key_is_upstream_error() {
    let config = live_config();
    let generator =
        ChatCompletionsGenerator::with_api_key(&config, Some("sk-or-invalid".to_string())).unwrap();
    let agent = Agent::new("Solo", "Say hi.", Arc::new(generator));

    let err = agent.produce_reply().unwrap_err();
    match err {
        dialogue::DialogueError::Generation(GenerationError::Upstream { status, .. }) => {
            assert!(status == 401 || status == 403, "unexpected status {status}");
        },
        other => panic!("expected upstream error, got {other}"),
    }
}
