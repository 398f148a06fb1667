//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary always has a
//! complete configuration, even when no config.toml is present.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    agent: AgentDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    scenario: String,
    log_level: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    iterations: u32,
    exploration: f64,
    verbose: bool,
    time_limit_ms: u64,
}

#[derive(Debug, Deserialize)]
struct AgentDefaults {
    agent_id: String,
    policy: String,
    battles: u32,
    log_interval: u32,
    max_decisions: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn scenario() -> &'static str {
    &DEFAULTS.common.scenario
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> u64 {
    DEFAULTS.common.seed
}

// MCTS
pub fn iterations() -> u32 {
    DEFAULTS.mcts.iterations
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn verbose() -> bool {
    DEFAULTS.mcts.verbose
}
pub fn time_limit_ms() -> u64 {
    DEFAULTS.mcts.time_limit_ms
}

// Agent
pub fn agent_id() -> &'static str {
    &DEFAULTS.agent.agent_id
}
pub fn policy() -> &'static str {
    &DEFAULTS.agent.policy
}
pub fn battles() -> u32 {
    DEFAULTS.agent.battles
}
pub fn log_interval() -> u32 {
    DEFAULTS.agent.log_interval
}
pub fn max_decisions() -> u32 {
    DEFAULTS.agent.max_decisions
}
