//! Decision policies for the agent

use anyhow::{anyhow, Result};
use engine_core::{choose, PlayerAction};
use games_cardbattle::Battle;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Chooses the player's moves during a battle.
pub trait BattlePolicy {
    /// Short name for logs and stats.
    fn name(&self) -> &'static str;

    /// Pick the next card to play, or end the turn.
    fn choose_card(&mut self, battle: &Battle) -> Result<PlayerAction>;

    /// Pick an enemy for a targeted card from the living `candidates`.
    fn choose_agent_target(&mut self, _battle: &Battle, candidates: &[usize]) -> usize {
        candidates.first().copied().unwrap_or(0)
    }

    /// Searches run and total search time (microseconds) since the last call.
    fn take_search_totals(&mut self) -> (u32, u64) {
        (0, 0)
    }
}

/// Policy that plays a uniformly random legal action.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl BattlePolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_card(&mut self, battle: &Battle) -> Result<PlayerAction> {
        let legal = battle.legal_player_actions();
        choose(&mut self.rng, &legal)
            .copied()
            .ok_or_else(|| anyhow!("No legal actions, battle is already over"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_cardbattle::{create_scenario, register_builtin_scenarios};

    #[test]
    fn test_random_policy_picks_legal_actions() {
        register_builtin_scenarios();
        let battle = create_scenario("cultist", 1).unwrap();
        let legal = battle.legal_player_actions();
        let mut policy = RandomPolicy::with_seed(42);

        for _ in 0..20 {
            let action = policy.choose_card(&battle).unwrap();
            assert!(legal.contains(&action));
        }
    }

    #[test]
    fn test_random_policy_is_seeded() {
        register_builtin_scenarios();
        let battle = create_scenario("jaw_worm", 5).unwrap();
        let mut a = RandomPolicy::with_seed(9);
        let mut b = RandomPolicy::with_seed(9);

        for _ in 0..10 {
            assert_eq!(
                a.choose_card(&battle).unwrap(),
                b.choose_card(&battle).unwrap()
            );
        }
    }

    #[test]
    fn test_random_policy_errors_when_battle_is_over() {
        register_builtin_scenarios();
        let mut battle = create_scenario("cultist", 1).unwrap().with_max_turns(0);
        assert!(battle.is_over());
        assert!(RandomPolicy::with_seed(1).choose_card(&battle).is_err());
        // Still over after a rejected move
        assert!(battle.end_turn().is_err());
    }

    #[test]
    fn test_default_target_is_first_candidate() {
        register_builtin_scenarios();
        let battle = create_scenario("slime_pair", 1).unwrap();
        let mut policy = RandomPolicy::with_seed(1);
        assert_eq!(policy.choose_agent_target(&battle, &[1, 0]), 1);
        assert_eq!(policy.choose_agent_target(&battle, &[]), 0);
    }

    #[test]
    fn test_random_policy_has_no_search_totals() {
        let mut policy = RandomPolicy::with_seed(1);
        assert_eq!(policy.name(), "random");
        assert_eq!(policy.take_search_totals(), (0, 0));
    }
}
