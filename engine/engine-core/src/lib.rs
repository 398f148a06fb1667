//! Core traits and types for the Duelist decision engine
//!
//! This crate provides the abstractions the search engine needs from a battle
//! simulation, without knowing anything about the combat rules themselves:
//! - `GameState`: the state adapter (legal actions, transitions, scoring, sampling)
//! - `Chooser`: injectable "pick one of N" randomness used by every random decision
//! - `GameAction` / `PlayerAction`: abstract moves and their concrete, hand-indexed form

pub mod action;
pub mod chooser;
pub mod state;

// Re-export main types for convenience
pub use action::{CardKey, GameAction, HandCard, PlayerAction};
pub use chooser::{choose, shuffle, Chooser, ScriptedChooser};
pub use state::GameState;
