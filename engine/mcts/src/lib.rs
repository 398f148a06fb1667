//! Monte Carlo Tree Search (MCTS) for stochastic, partially observable battles.
//!
//! This crate provides a game-agnostic UCB1 search that works with any state
//! implementing the `engine-core` [`GameState`](engine_core::GameState) trait.
//!
//! # Overview
//!
//! The tree is built over abstract actions rather than concrete states. Every
//! iteration starts from a fresh sampled copy of the root state, so hidden
//! information is re-resolved each time and a node's statistics average over
//! many possible worlds. Each iteration consists of four phases:
//!
//! 1. **Selection**: While every legal action of the sample already has a
//!    child, descend to the child with the highest UCB1 score
//! 2. **Expansion**: Add one child for a randomly chosen untried action
//! 3. **Rollout**: Play uniformly random actions until the battle ends
//! 4. **Backpropagation**: Add the terminal score to every node on the path
//!
//! After the iteration budget is spent the root child with the highest mean
//! outcome is recommended.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{run_mcts, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! games_cardbattle::register_builtin_scenarios();
//! let battle = games_cardbattle::create_scenario("cultist", 42).unwrap();
//!
//! let config = MctsConfig::default().with_iterations(200);
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(&battle, config, &mut rng).unwrap();
//!
//! println!("Best action: {}", result.action);
//! for child in &result.children {
//!     println!("{}: visits={}, avg={:.3}", child.action, child.visits, child.mean);
//! }
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `iterations`: Iterations per search (default: 100)
//! - `exploration`: UCB1 exploration constant (default: 1.0)
//! - `verbose`: Log the rendered tree after each search
//! - `time_limit`: Optional wall-clock budget checked between iterations

pub mod config;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{ConfigError, MctsConfig};
pub use node::{MctsNode, NodeId};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult, SearchStats};
pub use tree::{ChildStats, MctsTree, TreeStats};
