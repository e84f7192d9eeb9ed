//! Dialogue simulator CLI binary.
//!
//! # Commands
//!
//! - `run` - Run a scenario and print every turn as `(speaker): message`
//! - `check` - Validate a scenario and show the speaking order
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_API_KEY=sk-or-... dialogue run --config scenarios/debate.toml
//!
//! # No network, deterministic replies
//! dialogue run --config scenarios/debate.toml --dry-run --rounds 4
//!
//! # Keep a JSON record of the run
//! dialogue run --config scenarios/debate.toml --output run.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialogue::{
    build_agents, generation, Config, DialogueError, RunRecord, Simulator, Turn, VERSION,
};

#[derive(Parser)]
#[command(name = "dialogue")]
#[command(version = VERSION)]
#[command(about = "Turn-based multi-agent dialogue simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario file (default: <config dir>/dialogue/scenario.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of rounds
        #[arg(short, long, allow_negative_numbers = true)]
        rounds: Option<i64>,

        /// Override the model
        #[arg(short, long)]
        model: Option<String>,

        /// Use deterministic offline replies instead of the configured provider
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON record of the run
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a scenario without running it
    Check {
        /// Scenario file (default: <config dir>/dialogue/scenario.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            rounds,
            model,
            dry_run,
            output,
            verbose,
        } => cmd_run(config, rounds, model, dry_run, output, verbose),

        Commands::Check { config } => cmd_check(config),
    }
}

fn init_logging(verbose: bool) {
    // stderr only: stdout carries the transcript
    let log_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()
            .context("no --config given and no config directory on this platform")?,
    };

    let config = Config::from_file(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?
        .with_env_overrides();
    Ok(config)
}

fn cmd_run(
    config: Option<PathBuf>,
    rounds: Option<i64>,
    model: Option<String>,
    dry_run: bool,
    output: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);

    let mut config = load_config(config)?;
    if let Some(rounds) = rounds {
        config.scenario.rounds = rounds;
    }
    if let Some(model) = model {
        config.generation.model = model;
    }
    config.validate()?;

    let scenario = &config.scenario;
    let num_rounds = scenario.num_rounds()?;
    let generator = generation::from_config(&config.generation, dry_run)?;
    tracing::info!(
        generator = generator.name(),
        agents = scenario.agents.len(),
        rounds = num_rounds,
        "starting simulation"
    );

    let mut sim = Simulator::new(build_agents(scenario, &generator))?;
    let seed = Turn::seed(&scenario.opener.name, &scenario.opener.message);
    let mut record = RunRecord::new(seed.clone());

    println!("{seed}");
    println!();

    let result = sim.run_with(
        num_rounds,
        &scenario.opener.name,
        &scenario.opener.message,
        |turn| {
            println!("{turn}");
            println!();
            record.push_turn(turn);
        },
    );

    record.finish(&sim, result.as_ref().err().map(DialogueError::to_string));

    if let Some(path) = &output {
        record
            .write_json(path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Run record written to: {}", path.display());
    }

    if verbose {
        let stats = sim.stats();
        eprintln!("Turns:          {}", stats.turns);
        eprintln!("Avg reply:      {:.0} chars", stats.avg_reply_chars());
        for (speaker, count) in &stats.turns_by_speaker {
            eprintln!("  {speaker:<14}{count}");
        }
    }

    result.with_context(|| format!("simulation stopped after {} turns", sim.turn_index()))
}

fn cmd_check(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    config.validate()?;

    let scenario = &config.scenario;
    let num_rounds = scenario.num_rounds()?;
    let offline = generation::from_config(&config.generation, true)?;
    let sim = Simulator::new(build_agents(scenario, &offline))?;

    println!("Opener:   ({}): {}", scenario.opener.name, scenario.opener.message);
    println!("Rounds:   {num_rounds}");
    println!(
        "Provider: {:?} ({})",
        config.generation.provider, config.generation.model
    );
    println!();
    println!("Agents:");
    for (idx, agent) in sim.agents().iter().enumerate() {
        println!("  [{idx}] {}", agent.identity());
    }
    println!();
    println!("Speaking order:");
    for turn in 0..num_rounds {
        let idx = sim.select_next_speaker(turn)?;
        println!("  turn {:>3}: {}", turn + 1, sim.agents()[idx].identity());
    }

    Ok(())
}
