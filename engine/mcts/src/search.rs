//! MCTS search implementation.
//!
//! Each iteration draws a fresh sampled copy of the root state and runs the
//! four phases against the shared tree:
//! 1. Selection: descend through fully explored nodes using UCB1
//! 2. Expansion: add one child for an action not yet tried at this node
//! 3. Rollout: play uniformly random actions to a terminal state
//! 4. Backpropagation: add the terminal score to every node on the path
//!
//! Hidden information (draw order, enemy intents) is resolved differently in
//! every sample, so the statistics at a node average over those outcomes.

use std::time::Instant;

use engine_core::{Chooser, GameState};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::config::{ConfigError, MctsConfig};
use crate::node::NodeId;
use crate::tree::{ChildStats, MctsTree};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Cannot search from a terminal state")]
    TerminalRoot,

    #[error("Non-terminal state with no legal actions at depth {depth}")]
    DeadEnd { depth: u32 },
}

/// Counters collected over one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Iterations actually performed
    pub iterations: u32,
    /// Nodes added to the tree
    pub expansions: u32,
    /// Selections that ended on a terminal state inside the tree
    pub terminal_hits: u32,
    /// Random actions applied during rollouts
    pub rollout_steps: u64,
    /// Wall-clock time for the whole search (microseconds)
    pub total_time_us: u64,
    /// Final tree size
    pub tree_nodes: usize,
    /// Final tree depth
    pub max_depth: u32,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    /// Recommended action
    pub action: A,

    /// Mean outcome at the root (0.0 when no search ran)
    pub value: f32,

    /// Number of iterations performed
    pub iterations: u32,

    /// Visit statistics of every root child, in expansion order
    pub children: Vec<ChildStats<A>>,

    pub stats: SearchStats,
}

/// MCTS search state for one decision.
pub struct MctsSearch<'a, S: GameState> {
    tree: MctsTree<S::Action>,
    root_state: &'a S,
    config: MctsConfig,
    stats: SearchStats,
}

impl<'a, S: GameState> MctsSearch<'a, S> {
    /// Create a new MCTS search rooted at `root_state`.
    pub fn new(root_state: &'a S, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;

        Ok(Self {
            tree: MctsTree::new(config.exploration),
            root_state,
            config,
            stats: SearchStats::default(),
        })
    }

    /// Run the search and recommend an action for the root state.
    ///
    /// If the root has exactly one legal action it is returned without
    /// searching. Otherwise the configured number of iterations is run (or
    /// fewer if the time limit expires) and the root child with the best mean
    /// outcome is returned, falling back to a random legal action if no child
    /// was ever visited.
    pub fn run<C: Chooser>(
        &mut self,
        chooser: &mut C,
    ) -> Result<SearchResult<S::Action>, SearchError> {
        if self.root_state.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }

        let mut legal = self.root_state.legal_actions();
        if legal.is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        if legal.len() == 1 {
            debug!("Single legal action, skipping search");
            return Ok(SearchResult {
                action: legal.swap_remove(0),
                value: 0.0,
                iterations: 0,
                children: Vec::new(),
                stats: self.stats.clone(),
            });
        }

        let start = Instant::now();
        for i in 0..self.config.iterations {
            if let Some(limit) = self.config.time_limit {
                if i > 0 && start.elapsed() >= limit {
                    debug!(completed = i, "Search time limit reached");
                    break;
                }
            }
            self.iterate(chooser)?;
        }

        let tree_stats = self.tree.stats();
        self.stats.total_time_us = start.elapsed().as_micros() as u64;
        self.stats.tree_nodes = tree_stats.total_nodes;
        self.stats.max_depth = tree_stats.max_depth;

        let action = match self.tree.best_action() {
            Some((action, _)) => action,
            None => {
                debug!("No visited root children, choosing a random legal action");
                let index = chooser.choose_index(legal.len());
                legal.swap_remove(index)
            }
        };

        debug!(
            iterations = self.stats.iterations,
            nodes = tree_stats.total_nodes,
            depth = tree_stats.max_depth,
            root_value = tree_stats.root_value,
            time_us = self.stats.total_time_us,
            action = ?action,
            "MCTS search complete"
        );

        if self.config.verbose {
            info!("Search tree after {} iterations:\n{}", self.stats.iterations, self.dump());
        }

        Ok(SearchResult {
            action,
            value: tree_stats.root_value,
            iterations: self.stats.iterations,
            children: self.tree.child_stats(self.tree.root()),
            stats: self.stats.clone(),
        })
    }

    /// Run a single iteration on a freshly sampled copy of the root state.
    pub fn iterate<C: Chooser>(&mut self, chooser: &mut C) -> Result<(), SearchError> {
        let mut sample = self.root_state.sample_copy(chooser);
        self.simulate(&mut sample, chooser)?;
        self.stats.iterations += 1;
        Ok(())
    }

    /// Selection and expansion on one sampled state.
    ///
    /// Descends while every legal action of the sample is already a child,
    /// applying the UCB1 choice to the sample at each step. Stops by
    /// backpropagating either a terminal score or the rollout result of a
    /// newly expanded child.
    fn simulate<C: Chooser>(&mut self, state: &mut S, chooser: &mut C) -> Result<(), SearchError> {
        let mut node_id = self.tree.root();
        let mut depth = 0u32;

        loop {
            if state.is_terminal() {
                let value = state.evaluate();
                self.tree.backpropagate(node_id, value);
                self.stats.terminal_hits += 1;
                trace!(node = node_id.0, depth, value, "Terminal state reached in tree");
                return Ok(());
            }

            let legal = state.legal_actions();
            if legal.is_empty() {
                return Err(SearchError::DeadEnd { depth });
            }

            let node = self.tree.get(node_id);
            let unexplored: Vec<S::Action> = legal
                .into_iter()
                .filter(|action| !node.has_child(action))
                .collect();

            if !unexplored.is_empty() {
                let value = self.expand(node_id, state, unexplored, chooser)?;
                trace!(node = node_id.0, depth, value, "Expanded and rolled out");
                return Ok(());
            }

            // Every child received a rollout when it was created
            let (action, child_id) = self
                .tree
                .select_child(node_id)
                .ok_or(SearchError::DeadEnd { depth })?;
            state.apply(&action);
            node_id = child_id;
            depth += 1;
        }
    }

    /// Add one untried action as a new child of `node_id`, roll out from the
    /// resulting state and backpropagate the result through the new child.
    fn expand<C: Chooser>(
        &mut self,
        node_id: NodeId,
        state: &mut S,
        mut candidates: Vec<S::Action>,
        chooser: &mut C,
    ) -> Result<f32, SearchError> {
        let index = chooser.choose_index(candidates.len());
        let action = candidates.swap_remove(index);

        state.apply(&action);
        let child_id = self.tree.add_child(node_id, action);
        self.stats.expansions += 1;

        let value = self.rollout(state, chooser)?;
        self.tree.backpropagate(child_id, value);
        Ok(value)
    }

    /// Play uniformly random legal actions until the state is terminal and
    /// return its score. The tree is not touched.
    fn rollout<C: Chooser>(&mut self, state: &mut S, chooser: &mut C) -> Result<f32, SearchError> {
        let mut depth = 0u32;
        while !state.is_terminal() {
            let mut legal = state.legal_actions();
            if legal.is_empty() {
                return Err(SearchError::DeadEnd { depth });
            }
            let action = legal.swap_remove(chooser.choose_index(legal.len()));
            state.apply(&action);
            depth += 1;
        }
        self.stats.rollout_steps += depth as u64;
        Ok(state.evaluate())
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree<S::Action> {
        &self.tree
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Render the tree with per-edge visit counts and means.
    pub fn dump(&self) -> String {
        self.tree.dump()
    }
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<S: GameState, C: Chooser>(
    root_state: &S,
    config: MctsConfig,
    chooser: &mut C,
) -> Result<SearchResult<S::Action>, SearchError> {
    let mut search = MctsSearch::new(root_state, config)?;
    search.run(chooser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::ScriptedChooser;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// Root offers A, B and C, each leading straight to a terminal score.
    #[derive(Debug, Clone)]
    struct ThreeWay {
        chosen: Option<char>,
    }

    impl GameState for ThreeWay {
        type Action = char;

        fn legal_actions(&self) -> Vec<char> {
            match self.chosen {
                None => vec!['A', 'B', 'C'],
                Some(_) => Vec::new(),
            }
        }

        fn apply(&mut self, action: &char) {
            self.chosen = Some(*action);
        }

        fn is_terminal(&self) -> bool {
            self.chosen.is_some()
        }

        fn evaluate(&self) -> f32 {
            match self.chosen {
                Some('A') => 1.0,
                Some('B') => 0.0,
                Some('C') => -1.0,
                _ => panic!("evaluate called on a non-terminal state"),
            }
        }

        fn sample_copy<R: Chooser + ?Sized>(&self, _chooser: &mut R) -> Self {
            self.clone()
        }
    }

    /// Race to a target total. Each step adds 1 or 2 plus a hidden bonus
    /// that is only resolved when the state is sampled.
    #[derive(Debug, Clone)]
    struct DiceRace {
        total: u32,
        steps: u32,
        bonus: u32,
    }

    const RACE_TARGET: u32 = 8;

    impl DiceRace {
        fn new() -> Self {
            Self {
                total: 0,
                steps: 0,
                bonus: 0,
            }
        }
    }

    impl GameState for DiceRace {
        type Action = u32;

        fn legal_actions(&self) -> Vec<u32> {
            if self.is_terminal() {
                Vec::new()
            } else {
                vec![1, 2]
            }
        }

        fn apply(&mut self, action: &u32) {
            self.total += action + self.bonus;
            self.steps += 1;
        }

        fn is_terminal(&self) -> bool {
            self.total >= RACE_TARGET
        }

        fn evaluate(&self) -> f32 {
            1.0 / self.steps as f32
        }

        fn sample_copy<R: Chooser + ?Sized>(&self, chooser: &mut R) -> Self {
            let mut copy = self.clone();
            copy.bonus = chooser.choose_index(2) as u32;
            copy
        }
    }

    /// A state that claims to be live but offers nothing to do.
    #[derive(Debug, Clone)]
    struct Stuck;

    impl GameState for Stuck {
        type Action = u8;

        fn legal_actions(&self) -> Vec<u8> {
            Vec::new()
        }

        fn apply(&mut self, _action: &u8) {}

        fn is_terminal(&self) -> bool {
            false
        }

        fn evaluate(&self) -> f32 {
            0.0
        }

        fn sample_copy<R: Chooser + ?Sized>(&self, _chooser: &mut R) -> Self {
            Stuck
        }
    }

    /// Single forced move at the root, then the same choice as ThreeWay.
    #[derive(Debug, Clone)]
    struct Forced {
        moved: bool,
    }

    impl GameState for Forced {
        type Action = &'static str;

        fn legal_actions(&self) -> Vec<&'static str> {
            if self.moved {
                Vec::new()
            } else {
                vec!["only"]
            }
        }

        fn apply(&mut self, _action: &&'static str) {
            self.moved = true;
        }

        fn is_terminal(&self) -> bool {
            self.moved
        }

        fn evaluate(&self) -> f32 {
            1.0
        }

        fn sample_copy<R: Chooser + ?Sized>(&self, _chooser: &mut R) -> Self {
            panic!("single-action roots must not be sampled");
        }
    }

    fn check_visit_conservation<A: Clone + PartialEq>(tree: &MctsTree<A>) {
        for node in tree.arena() {
            if node.is_leaf() {
                continue;
            }
            let child_visits: u32 = node
                .children
                .iter()
                .map(|(_, id)| tree.get(*id).visit_count)
                .sum();
            assert!(
                node.visit_count >= child_visits,
                "node has {} visits but children have {}",
                node.visit_count,
                child_visits
            );
        }
    }

    #[test]
    fn test_three_way_prefers_best_action() {
        let state = ThreeWay { chosen: None };
        let config = MctsConfig::for_testing()
            .with_iterations(30)
            .with_exploration(1.0);

        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&state, config).unwrap();
        let result = search.run(&mut rng).unwrap();

        assert_eq!(result.action, 'A');
        assert_eq!(result.iterations, 30);

        let a = result.children.iter().find(|c| c.action == 'A').unwrap();
        assert!(a.visits >= 1);
        assert!((a.mean - 1.0).abs() < 1e-6);

        // Every action was tried once before UCB1 took over
        assert_eq!(result.children.len(), 3);
        assert!(result.children.iter().all(|c| c.visits >= 1));
    }

    #[test]
    fn test_root_visits_equal_iterations() {
        let state = DiceRace::new();
        let config = MctsConfig::for_testing().with_iterations(200);

        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&state, config).unwrap();
        let result = search.run(&mut rng).unwrap();

        let tree = search.tree();
        assert_eq!(tree.get(tree.root()).visit_count, 200);
        assert_eq!(result.stats.iterations, 200);
        check_visit_conservation(tree);

        // Once both root actions exist, root visits are exactly the children's
        let root_child_visits: u32 = result.children.iter().map(|c| c.visits).sum();
        assert_eq!(root_child_visits, 200);
    }

    #[test]
    fn test_tree_grows_by_at_most_one_node_per_iteration() {
        let state = DiceRace::new();
        let mut search = MctsSearch::new(&state, MctsConfig::for_testing()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(9);

        let mut previous = search.tree().len();
        for _ in 0..100 {
            search.iterate(&mut rng).unwrap();
            let current = search.tree().len();
            assert!(current >= previous);
            assert!(current <= previous + 1);
            previous = current;
        }
        assert_eq!(search.stats().expansions as usize, previous - 1);
    }

    #[test]
    fn test_three_way_terminal_scores_are_stable() {
        let mut state = ThreeWay { chosen: None };
        state.apply(&'B');
        assert_eq!(state.evaluate(), state.evaluate());
    }

    #[test]
    fn test_single_action_shortcut() {
        let state = Forced { moved: false };
        let mut chooser = ScriptedChooser::first();

        let mut search = MctsSearch::new(&state, MctsConfig::for_testing()).unwrap();
        let result = search.run(&mut chooser).unwrap();

        assert_eq!(result.action, "only");
        assert_eq!(result.iterations, 0);
        assert!(result.children.is_empty());
        assert_eq!(search.tree().len(), 1);
        assert_eq!(chooser.calls(), 0);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let state = DiceRace::new();
        let config = MctsConfig::for_testing().with_iterations(120);

        let mut rng_a = ChaCha20Rng::seed_from_u64(1234);
        let mut search_a = MctsSearch::new(&state, config.clone()).unwrap();
        let result_a = search_a.run(&mut rng_a).unwrap();

        let mut rng_b = ChaCha20Rng::seed_from_u64(1234);
        let mut search_b = MctsSearch::new(&state, config).unwrap();
        let result_b = search_b.run(&mut rng_b).unwrap();

        assert_eq!(result_a.action, result_b.action);
        assert_eq!(search_a.tree().len(), search_b.tree().len());
        assert_eq!(search_a.dump(), search_b.dump());
        assert_eq!(result_a.children, result_b.children);
    }

    #[test]
    fn test_deterministic_with_scripted_chooser() {
        let state = DiceRace::new();
        let config = MctsConfig::for_testing().with_iterations(40);
        let script = vec![1, 0, 1, 1, 0, 3, 2];

        let mut first = ScriptedChooser::new(script.clone());
        let mut search_a = MctsSearch::new(&state, config.clone()).unwrap();
        let result_a = search_a.run(&mut first).unwrap();

        let mut second = ScriptedChooser::new(script);
        let mut search_b = MctsSearch::new(&state, config).unwrap();
        let result_b = search_b.run(&mut second).unwrap();

        assert_eq!(result_a.action, result_b.action);
        assert_eq!(search_a.dump(), search_b.dump());
        assert_eq!(first.calls(), second.calls());
    }

    #[test]
    fn test_first_chooser_expands_in_legal_order() {
        let state = ThreeWay { chosen: None };
        let mut chooser = ScriptedChooser::first();
        let config = MctsConfig::for_testing().with_iterations(3);

        let mut search = MctsSearch::new(&state, config).unwrap();
        search.run(&mut chooser).unwrap();

        // Untried actions keep their legal order
        let order: Vec<char> = search
            .tree()
            .get(search.tree().root())
            .children
            .iter()
            .map(|(a, _)| *a)
            .collect();
        assert_eq!(order, vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_zero_exploration_exploits() {
        let state = ThreeWay { chosen: None };
        let config = MctsConfig::for_testing()
            .with_iterations(20)
            .with_exploration(0.0);

        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut search = MctsSearch::new(&state, config).unwrap();
        let result = search.run(&mut rng).unwrap();

        let visits = |action: char| {
            result
                .children
                .iter()
                .find(|c| c.action == action)
                .map(|c| c.visits)
                .unwrap()
        };
        assert_eq!(visits('B'), 1);
        assert_eq!(visits('C'), 1);
        assert_eq!(visits('A'), 18);
    }

    #[test]
    fn test_time_limit_still_runs_one_iteration() {
        let state = DiceRace::new();
        let config = MctsConfig::for_testing()
            .with_iterations(1_000_000)
            .with_time_limit(std::time::Duration::ZERO);

        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let result = run_mcts(&state, config, &mut rng).unwrap();
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_terminal_root_is_an_error() {
        let state = ThreeWay { chosen: Some('A') };
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = run_mcts(&state, MctsConfig::for_testing(), &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::TerminalRoot));
    }

    #[test]
    fn test_stuck_root_is_an_error() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let err = run_mcts(&Stuck, MctsConfig::for_testing(), &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::NoLegalActions));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let state = ThreeWay { chosen: None };
        let result = MctsSearch::new(&state, MctsConfig::for_testing().with_iterations(0));
        assert!(matches!(result, Err(SearchError::InvalidConfig(_))));
    }

    #[test]
    fn test_search_does_not_mutate_root_state() {
        let state = DiceRace::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        run_mcts(&state, MctsConfig::for_testing(), &mut rng).unwrap();
        assert_eq!(state.total, 0);
        assert_eq!(state.steps, 0);
    }

    #[test]
    fn test_dump_lists_root_children() {
        let state = ThreeWay { chosen: None };
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&state, MctsConfig::for_testing()).unwrap();
        search.run(&mut rng).unwrap();

        let dump = search.dump();
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.contains("A: visits="));
        assert!(dump.contains("avg=-1.000"));
    }

    #[test]
    fn test_card_battle_search() {
        games_cardbattle::register_builtin_scenarios();
        let battle = games_cardbattle::create_scenario("cultist", 42).unwrap();
        let config = MctsConfig::for_testing().with_iterations(100);

        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut search = MctsSearch::new(&battle, config).unwrap();
        let result = search.run(&mut rng).unwrap();

        assert!(battle.legal_actions().contains(&result.action));
        assert_eq!(search.tree().get(search.tree().root()).visit_count, 100);
        check_visit_conservation(search.tree());
        assert_eq!(battle.turn(), 1);
    }

    #[test]
    fn test_card_battle_takes_lethal() {
        use games_cardbattle::{Battle, Card, CardKind, Enemy, Intent};

        let enemy = Enemy::new("Dummy", 6, vec![Intent::Attack { damage: 10, times: 1 }]);
        let battle = Battle::new(50, vec![Card::new(CardKind::Strike); 5], vec![enemy], 1);

        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let result = run_mcts(&battle, MctsConfig::for_testing(), &mut rng).unwrap();
        let strike = engine_core::GameAction::play("Strike", 0);
        assert_eq!(result.action, strike);

        let stats = result.children.iter().find(|c| c.action == strike).unwrap();
        assert!((stats.mean - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_card_battle_is_deterministic() {
        games_cardbattle::register_builtin_scenarios();
        let battle = games_cardbattle::create_scenario("slime_pair", 3).unwrap();
        let config = MctsConfig::for_testing().with_iterations(60);

        let mut rng_a = ChaCha20Rng::seed_from_u64(8);
        let mut search_a = MctsSearch::new(&battle, config.clone()).unwrap();
        let result_a = search_a.run(&mut rng_a).unwrap();

        let mut rng_b = ChaCha20Rng::seed_from_u64(8);
        let mut search_b = MctsSearch::new(&battle, config).unwrap();
        let result_b = search_b.run(&mut rng_b).unwrap();

        assert_eq!(result_a.action, result_b.action);
        assert_eq!(search_a.dump(), search_b.dump());
    }
}
