//! Card battle simulation for the Duelist decision engine
//!
//! A single-player deck-building battle: the player draws a hand each turn,
//! spends energy to play attack and skill cards, and fights enemies that
//! announce randomly drawn intents. [`Battle`] implements
//! [`engine_core::GameState`] so it can be searched directly.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::GameState;
//! use games_cardbattle::{create_scenario, register_builtin_scenarios};
//!
//! // Register the built-in scenarios with the global registry
//! register_builtin_scenarios();
//!
//! let battle = create_scenario("cultist", 42).expect("cultist should be registered");
//! assert!(!battle.is_terminal());
//! assert_eq!(battle.hand().len(), 5);
//! ```

pub mod battle;
pub mod card;
pub mod enemy;
pub mod scenarios;

pub use battle::{
    Battle, BattleError, Player, DEFAULT_MAX_TURNS, ENERGY_PER_TURN, HAND_SIZE, MAX_HAND_SIZE,
};
pub use card::{starter_deck, Card, CardEffect, CardKind};
pub use enemy::{Enemy, Intent};
pub use scenarios::{
    create_scenario, is_registered, list_scenarios, register_builtin_scenarios,
    register_scenario, ScenarioFactory,
};
