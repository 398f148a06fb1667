//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DUELIST_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the DUELIST_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_PATH_ENV, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// A file that cannot be read or parsed is reported and replaced by the
/// built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, bool)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!(key = $key, value = %raw, "Ignoring unparsable override"),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: DUELIST_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "DUELIST_COMMON_DATA_DIR");
    env_override!(config, common.scenario, "DUELIST_COMMON_SCENARIO");
    env_override!(config, common.log_level, "DUELIST_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "DUELIST_COMMON_SEED", parse);

    // MCTS
    env_override!(config, mcts.iterations, "DUELIST_MCTS_ITERATIONS", parse);
    env_override!(config, mcts.exploration, "DUELIST_MCTS_EXPLORATION", parse);
    env_override!(config, mcts.verbose, "DUELIST_MCTS_VERBOSE", parse);
    env_override!(
        config,
        mcts.time_limit_ms,
        "DUELIST_MCTS_TIME_LIMIT_MS",
        parse
    );

    // Agent
    env_override!(config, agent.agent_id, "DUELIST_AGENT_AGENT_ID");
    env_override!(config, agent.policy, "DUELIST_AGENT_POLICY");
    env_override!(config, agent.battles, "DUELIST_AGENT_BATTLES", parse);
    env_override!(
        config,
        agent.log_interval,
        "DUELIST_AGENT_LOG_INTERVAL",
        parse
    );
    env_override!(
        config,
        agent.max_decisions,
        "DUELIST_AGENT_MAX_DECISIONS",
        parse
    );

    config
}
