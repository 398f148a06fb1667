//! Duelist agent - plays card battles with Monte Carlo Tree Search
//!
//! A batch process that:
//! 1. Loads configuration (CLI > env > config.toml > built-in defaults)
//! 2. Plays the configured scenario repeatedly with the chosen policy
//! 3. Logs progress and a final summary
//! 4. Writes `agent_stats.json` to the data directory

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod config;
mod mcts_policy;
mod policy;
mod runner;
mod stats;

use crate::config::Config;
use crate::runner::{build_policy, Runner};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    eprintln!("Duelist agent starting...");

    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    games_cardbattle::register_builtin_scenarios();

    let stats_path = config.stats_path();
    let policy = build_policy(&config);
    let mut runner = Runner::new(config, policy)?;

    let run_result = runner.run();

    let summary = runner.stats().snapshot();
    info!(
        scenario = %summary.scenario,
        policy = %summary.policy,
        battles = summary.battles,
        wins = summary.wins,
        losses = summary.losses,
        timeouts = summary.timeouts,
        abandoned = summary.abandoned,
        win_rate = format!("{:.3}", summary.win_rate),
        avg_score = format!("{:.3}", summary.avg_score),
        avg_turns = format!("{:.1}", summary.avg_turns),
        avg_search_ms = format!("{:.2}", summary.avg_search_us / 1000.0),
        runtime_s = format!("{:.1}", summary.runtime_seconds),
        "Run summary"
    );

    if let Some(path) = stats_path {
        runner.stats().write_stats(&path);
    }

    match run_result {
        Ok(()) => {
            info!("Agent completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Agent failed: {}", e);
            Err(e)
        }
    }
}
