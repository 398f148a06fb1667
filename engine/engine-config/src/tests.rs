//! Tests for the configuration module.

use super::*;
use std::io::Write;
use std::sync::Mutex;

/// Serializes tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.scenario, "cultist");
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.common.seed, 0);
    assert_eq!(config.agent.agent_id, "agent-1");
    assert_eq!(config.agent.policy, "mcts");
    assert_eq!(config.mcts.iterations, 100);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.mcts.iterations, 100);
    assert!((config.mcts.exploration - 1.0).abs() < f64::EPSILON);
    assert!(!config.mcts.verbose);
    assert_eq!(config.mcts.time_limit_ms, 0);
}

#[test]
fn test_agent_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.agent.battles, 20);
    assert_eq!(config.agent.log_interval, 5);
    assert_eq!(config.agent.max_decisions, 500);
}

#[test]
fn test_duelist_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("DUELIST_COMMON_SCENARIO", "jaw_worm");
    std::env::set_var("DUELIST_MCTS_ITERATIONS", "7");
    std::env::set_var("DUELIST_MCTS_EXPLORATION", "0.25");
    std::env::set_var("DUELIST_MCTS_VERBOSE", "true");
    std::env::set_var("DUELIST_AGENT_POLICY", "random");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.common.scenario, "jaw_worm");
    assert_eq!(config.mcts.iterations, 7);
    assert!((config.mcts.exploration - 0.25).abs() < f64::EPSILON);
    assert!(config.mcts.verbose);
    assert_eq!(config.agent.policy, "random");

    std::env::remove_var("DUELIST_COMMON_SCENARIO");
    std::env::remove_var("DUELIST_MCTS_ITERATIONS");
    std::env::remove_var("DUELIST_MCTS_EXPLORATION");
    std::env::remove_var("DUELIST_MCTS_VERBOSE");
    std::env::remove_var("DUELIST_AGENT_POLICY");
}

#[test]
fn test_unparsable_env_override_is_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::set_var("DUELIST_AGENT_BATTLES", "lots");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.agent.battles, 20);

    std::env::remove_var("DUELIST_AGENT_BATTLES");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
scenario = "slime_pair"
data_dir = "/custom/data"
seed = 99

[agent]
agent_id = "my-agent"
battles = 100

[mcts]
iterations = 50
exploration = 0.7
time_limit_ms = 250
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.scenario, "slime_pair");
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.common.seed, 99);
    assert_eq!(config.agent.agent_id, "my-agent");
    assert_eq!(config.agent.battles, 100);
    assert_eq!(config.mcts.iterations, 50);
    assert!((config.mcts.exploration - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.mcts.time_limit_ms, 250);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[common]
scenario = "jaw_worm"
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.scenario, "jaw_worm");
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.agent.agent_id, "agent-1"); // Default
    assert_eq!(config.mcts.iterations, 100); // Default
}

#[test]
fn test_load_from_path() {
    let _guard = ENV_LOCK.lock().unwrap();
    let path = std::env::temp_dir().join(format!("duelist-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[mcts]\niterations = 321").unwrap();
    drop(file);

    let config = load_from_path(&path);
    assert_eq!(config.mcts.iterations, 321);
    assert_eq!(config.common.scenario, "cultist");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_load_from_invalid_path_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let path = std::path::Path::new("/nonexistent/duelist/config.toml");
    let config = load_from_path(path);
    assert_eq!(config.mcts.iterations, 100);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.scenario, cloned.common.scenario);
    assert_eq!(config.agent.agent_id, cloned.agent.agent_id);
}
