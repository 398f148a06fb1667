//! MCTS-based policy
//!
//! Runs one search per decision over sampled copies of the battle and turns
//! the recommended card identity back into a position in the current hand.

use anyhow::{Context, Result};
use engine_core::PlayerAction;
use games_cardbattle::Battle;
use mcts::{run_mcts, MctsConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::policy::BattlePolicy;

/// Policy that picks each card with Monte Carlo Tree Search.
#[derive(Debug)]
pub struct MctsPolicy {
    config: MctsConfig,
    /// RNG for sampling, expansion order and rollouts
    rng: ChaCha20Rng,
    searches: u32,
    search_time_us: u64,
}

impl MctsPolicy {
    /// Create with a specific seed for determinism.
    pub fn with_seed(config: MctsConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
            searches: 0,
            search_time_us: 0,
        }
    }
}

impl BattlePolicy for MctsPolicy {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn choose_card(&mut self, battle: &Battle) -> Result<PlayerAction> {
        let result = run_mcts(battle, self.config.clone(), &mut self.rng)
            .with_context(|| format!("MCTS search failed at {}", battle))?;

        // Forced moves skip the search and are not counted
        if result.iterations > 0 {
            self.searches += 1;
            self.search_time_us += result.stats.total_time_us;
        }

        debug!(
            action = %result.action,
            value = result.value,
            iterations = result.iterations,
            nodes = result.stats.tree_nodes,
            "MCTS chose action"
        );

        Ok(result.action.to_action(battle.hand()))
    }

    fn take_search_totals(&mut self) -> (u32, u64) {
        let totals = (self.searches, self.search_time_us);
        self.searches = 0;
        self.search_time_us = 0;
        totals
    }
}
