//! Scenario registry
//!
//! Scenarios are registered by name and looked up at runtime, so the agent
//! can pick a battle setup from its configuration.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::battle::Battle;
use crate::card::{starter_deck, Card, CardKind};
use crate::enemy::{Enemy, Intent};

/// Factory function building a fresh battle from a seed.
pub type ScenarioFactory = fn(seed: u64) -> Battle;

static REGISTRY: Lazy<Mutex<HashMap<String, ScenarioFactory>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

static INIT: Once = Once::new();

fn registry() -> MutexGuard<'static, HashMap<String, ScenarioFactory>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a scenario, replacing any existing one with the same name.
pub fn register_scenario(name: impl Into<String>, factory: ScenarioFactory) {
    let name = name.into();
    let mut registry = registry();
    if registry.contains_key(&name) {
        warn!(scenario = %name, "Overriding existing scenario registration");
    }
    registry.insert(name, factory);
}

/// Build a new battle for a registered scenario.
///
/// Returns `None` if no scenario with that name is registered.
pub fn create_scenario(name: &str, seed: u64) -> Option<Battle> {
    let factory = registry().get(name).copied();
    match factory {
        Some(factory) => Some(factory(seed)),
        None => {
            warn!(scenario = %name, "Attempted to create unregistered scenario");
            None
        }
    }
}

/// Names of all registered scenarios, sorted.
pub fn list_scenarios() -> Vec<String> {
    let mut names: Vec<String> = registry().keys().cloned().collect();
    names.sort();
    names
}

pub fn is_registered(name: &str) -> bool {
    registry().contains_key(name)
}

/// Register the built-in scenarios. Safe to call more than once.
///
/// - `cultist`: one Cultist, starter deck
/// - `jaw_worm`: one Jaw Worm, starter deck plus Pommel Strike and Shrug It Off+
/// - `slime_pair`: two slimes, starter deck plus Strike+
pub fn register_builtin_scenarios() {
    INIT.call_once(|| {
        register_scenario("cultist", cultist);
        register_scenario("jaw_worm", jaw_worm);
        register_scenario("slime_pair", slime_pair);
    });
}

const PLAYER_HP: u32 = 80;

fn cultist(seed: u64) -> Battle {
    let enemy = Enemy::new(
        "Cultist",
        48,
        vec![Intent::Buff(3), Intent::Attack { damage: 6, times: 1 }],
    );
    Battle::new(PLAYER_HP, starter_deck(), vec![enemy], seed)
}

fn jaw_worm(seed: u64) -> Battle {
    let enemy = Enemy::new(
        "Jaw Worm",
        42,
        vec![
            Intent::Attack { damage: 11, times: 1 },
            Intent::AttackBlock { damage: 7, block: 5 },
            Intent::Buff(3),
        ],
    );
    let mut deck = starter_deck();
    deck.push(Card::new(CardKind::PommelStrike));
    deck.push(Card::upgraded(CardKind::ShrugItOff, 1));
    Battle::new(PLAYER_HP, deck, vec![enemy], seed)
}

fn slime_pair(seed: u64) -> Battle {
    let spike = Enemy::new(
        "Spike Slime",
        28,
        vec![Intent::Attack { damage: 5, times: 1 }, Intent::Buff(1)],
    );
    let acid = Enemy::new(
        "Acid Slime",
        24,
        vec![
            Intent::Attack { damage: 7, times: 1 },
            Intent::Attack { damage: 3, times: 2 },
            Intent::Block(4),
        ],
    );
    let mut deck = starter_deck();
    deck.push(Card::upgraded(CardKind::Strike, 1));
    Battle::new(PLAYER_HP, deck, vec![spike, acid], seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(seed: u64) -> Battle {
        let enemy = Enemy::new("Dummy", 1, vec![Intent::Block(0)]);
        Battle::new(10, starter_deck(), vec![enemy], seed)
    }

    fn tiny_strong(seed: u64) -> Battle {
        let enemy = Enemy::new("Dummy", 99, vec![Intent::Block(0)]);
        Battle::new(10, starter_deck(), vec![enemy], seed)
    }

    #[test]
    fn test_builtin_scenarios_registered() {
        register_builtin_scenarios();
        register_builtin_scenarios();

        for name in ["cultist", "jaw_worm", "slime_pair"] {
            assert!(is_registered(name), "{name} should be registered");
        }
        let names = list_scenarios();
        assert_eq!(names.iter().filter(|n| *n == "cultist").count(), 1);
    }

    #[test]
    fn test_create_scenario() {
        register_builtin_scenarios();
        let battle = create_scenario("slime_pair", 7).unwrap();
        assert_eq!(battle.enemies().len(), 2);
        assert_eq!(battle.hand().len(), 5);
        assert_eq!(battle.turn(), 1);
    }

    #[test]
    fn test_create_unknown_scenario() {
        assert!(create_scenario("no_such_scenario", 0).is_none());
        assert!(!is_registered("no_such_scenario"));
    }

    #[test]
    fn test_register_overrides_existing() {
        register_scenario("override_test", tiny);
        assert_eq!(create_scenario("override_test", 0).unwrap().enemies()[0].hp, 1);

        register_scenario("override_test", tiny_strong);
        assert_eq!(create_scenario("override_test", 0).unwrap().enemies()[0].hp, 99);
    }
}
