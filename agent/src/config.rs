//! Configuration for the battle agent
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, ValueEnum};
use engine_config::{load_config, CentralConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

/// Which policy drives the player's decisions.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Monte Carlo Tree Search over sampled battle copies
    Mcts,
    /// Uniformly random legal action
    Random,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Mcts => write!(f, "mcts"),
            PolicyKind::Random => write!(f, "random"),
        }
    }
}

// Default value functions that read from central config
fn default_agent_id() -> String {
    CENTRAL_CONFIG.agent.agent_id.clone()
}

fn default_scenario() -> String {
    CENTRAL_CONFIG.common.scenario.clone()
}

fn default_policy() -> PolicyKind {
    PolicyKind::from_str(&CENTRAL_CONFIG.agent.policy, true).unwrap_or(PolicyKind::Mcts)
}

fn default_battles() -> u32 {
    CENTRAL_CONFIG.agent.battles
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.common.seed
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.mcts.iterations
}

fn default_exploration() -> f32 {
    CENTRAL_CONFIG.mcts.exploration as f32
}

fn default_verbose() -> bool {
    CENTRAL_CONFIG.mcts.verbose
}

fn default_time_limit_ms() -> u64 {
    CENTRAL_CONFIG.mcts.time_limit_ms
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.agent.log_interval
}

fn default_max_decisions() -> u32 {
    CENTRAL_CONFIG.agent.max_decisions
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "duelist-agent")]
#[command(about = "Duelist agent - plays card battles with Monte Carlo Tree Search")]
#[command(
    long_about = "Agent that plays a registered card battle scenario repeatedly, choosing
each card with MCTS (or a random baseline), and reports win rate and search statistics.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Agent identifier used in logs and stats
    #[arg(long, default_value_t = default_agent_id())]
    pub agent_id: String,

    /// Scenario to play (cultist, jaw_worm, slime_pair)
    #[arg(long, default_value_t = default_scenario())]
    pub scenario: String,

    /// Decision policy
    #[arg(long, value_enum, default_value_t = default_policy())]
    pub policy: PolicyKind,

    /// Number of battles to play
    #[arg(long, default_value_t = default_battles())]
    pub battles: u32,

    /// Base seed; battle i is dealt with seed + i
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// MCTS iterations per decision
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f32,

    /// Log the search tree after every decision
    #[arg(long, default_value_t = default_verbose(), action = ArgAction::Set)]
    pub verbose: bool,

    /// Per-decision time budget in milliseconds (0 for none)
    #[arg(long, default_value_t = default_time_limit_ms())]
    pub time_limit_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Log progress every N battles (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,

    /// Decisions allowed per battle before it is abandoned
    #[arg(long, default_value_t = default_max_decisions())]
    pub max_decisions: u32,

    /// Directory for agent_stats.json (empty to skip writing)
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.agent_id.is_empty() {
            return Err(anyhow!("agent_id cannot be empty"));
        }

        if self.scenario.is_empty() {
            return Err(anyhow!("scenario cannot be empty"));
        }

        if self.battles == 0 {
            return Err(anyhow!("battles must be greater than 0"));
        }

        if self.iterations == 0 {
            return Err(anyhow!("iterations must be greater than 0"));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a finite non-negative number, got {}",
                self.exploration
            ));
        }

        if self.max_decisions == 0 {
            return Err(anyhow!("max_decisions must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    /// Search settings for [`crate::mcts_policy::MctsPolicy`].
    pub fn mcts_config(&self) -> mcts::MctsConfig {
        let config = mcts::MctsConfig::default()
            .with_iterations(self.iterations)
            .with_exploration(self.exploration)
            .with_verbose(self.verbose);
        match self.time_limit() {
            Some(limit) => config.with_time_limit(limit),
            None => config,
        }
    }

    /// Path of the stats file, if stats are written at all.
    pub fn stats_path(&self) -> Option<String> {
        if self.data_dir.is_empty() {
            None
        } else {
            Some(format!("{}/agent_stats.json", self.data_dir))
        }
    }
}
