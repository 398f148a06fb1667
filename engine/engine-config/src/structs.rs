//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_scenario() -> String {
    defaults::scenario().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_verbose() -> bool {
    defaults::verbose()
}
fn d_time_limit_ms() -> u64 {
    defaults::time_limit_ms()
}
fn d_agent_id() -> String {
    defaults::agent_id().into()
}
fn d_policy() -> String {
    defaults::policy().into()
}
fn d_battles() -> u32 {
    defaults::battles()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}
fn d_max_decisions() -> u32 {
    defaults::max_decisions()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    /// Directory for run statistics
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    /// Registered scenario to play
    #[serde(default = "d_scenario")]
    pub scenario: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Base seed; battle `i` uses `seed + i`
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            scenario: defaults::scenario().into(),
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    /// UCB1 exploration constant
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    #[serde(default = "d_verbose")]
    pub verbose: bool,
    /// Per-decision wall-clock budget in milliseconds (0 = unlimited)
    #[serde(default = "d_time_limit_ms")]
    pub time_limit_ms: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            exploration: defaults::exploration(),
            verbose: defaults::verbose(),
            time_limit_ms: defaults::time_limit_ms(),
        }
    }
}

/// Agent (battle runner) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(default = "d_agent_id")]
    pub agent_id: String,
    /// Decision policy: "mcts" or "random"
    #[serde(default = "d_policy")]
    pub policy: String,
    #[serde(default = "d_battles")]
    pub battles: u32,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
    /// Decisions allowed per battle before it is abandoned
    #[serde(default = "d_max_decisions")]
    pub max_decisions: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: defaults::agent_id().into(),
            policy: defaults::policy().into(),
            battles: defaults::battles(),
            log_interval: defaults::log_interval(),
            max_decisions: defaults::max_decisions(),
        }
    }
}
