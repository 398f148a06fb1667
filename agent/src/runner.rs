//! Battle runner
//!
//! Plays the configured number of battles with one policy, feeding the
//! outcomes into [`RunStats`].

use anyhow::{anyhow, Context, Result};
use engine_core::PlayerAction;
use games_cardbattle::{create_scenario, is_registered, Battle};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::config::{Config, PolicyKind};
use crate::mcts_policy::MctsPolicy;
use crate::policy::{BattlePolicy, RandomPolicy};
use crate::stats::{Outcome, RunStats};

/// Result of one finished battle.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleReport {
    pub outcome: Outcome,
    pub score: f32,
    pub turns: u32,
    pub decisions: u32,
    pub player_hp: u32,
}

/// Build the policy named by the configuration.
///
/// Policies are seeded from the base seed so whole runs are reproducible.
pub fn build_policy(config: &Config) -> Box<dyn BattlePolicy> {
    match config.policy {
        PolicyKind::Mcts => Box::new(MctsPolicy::with_seed(config.mcts_config(), config.seed)),
        PolicyKind::Random => Box::new(RandomPolicy::with_seed(config.seed)),
    }
}

pub struct Runner {
    config: Config,
    policy: Box<dyn BattlePolicy>,
    stats: RunStats,
}

impl Runner {
    pub fn new(config: Config, policy: Box<dyn BattlePolicy>) -> Result<Self> {
        if !is_registered(&config.scenario) {
            return Err(anyhow!(
                "Scenario '{}' not registered (available: {})",
                config.scenario,
                games_cardbattle::list_scenarios().join(", ")
            ));
        }
        let stats = RunStats::new(&config.scenario, policy.name());
        Ok(Self {
            config,
            policy,
            stats,
        })
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Play every battle of the run.
    ///
    /// A battle that fails is logged and counted as abandoned; the run
    /// carries on with the next one.
    pub fn run(&mut self) -> Result<()> {
        info!(
            agent_id = %self.config.agent_id,
            scenario = %self.config.scenario,
            policy = self.policy.name(),
            battles = self.config.battles,
            "Starting run"
        );

        // Progress bar only on a terminal, and not while search trees are logged
        let show_progress =
            !self.config.verbose && std::io::IsTerminal::is_terminal(&std::io::stderr());
        let progress = if show_progress {
            let pb = ProgressBar::new(self.config.battles as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} battles ({eta})")
                    .context("invalid progress bar template")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for index in 0..self.config.battles {
            match self.play_battle(index) {
                Ok(report) => {
                    debug!(
                        battle = index + 1,
                        outcome = ?report.outcome,
                        hp = report.player_hp,
                        turns = report.turns,
                        "Battle finished"
                    );
                    self.stats.record_battle(
                        report.outcome,
                        report.score,
                        report.turns,
                        report.decisions,
                    );
                }
                Err(e) => {
                    error!("Battle {} failed: {:#}", index + 1, e);
                    self.stats.record_abandoned();
                }
            }
            let (searches, time_us) = self.policy.take_search_totals();
            self.stats.record_searches(searches, time_us);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            let played = index + 1;
            if self.config.log_interval > 0 && played % self.config.log_interval == 0 {
                let log = || {
                    let snapshot = self.stats.snapshot();
                    info!(
                        played,
                        wins = snapshot.wins,
                        win_rate = format!("{:.2}", snapshot.win_rate),
                        avg_score = format!("{:.3}", snapshot.avg_score),
                        avg_search_ms = format!("{:.2}", snapshot.avg_search_us / 1000.0),
                        "Progress"
                    );
                };
                match progress {
                    Some(ref pb) => pb.suspend(log),
                    None => log(),
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok(())
    }

    /// Play battle number `index`, dealt with `seed + index`.
    pub fn play_battle(&mut self, index: u32) -> Result<BattleReport> {
        let seed = self.config.seed.wrapping_add(index as u64);
        let mut battle = create_scenario(&self.config.scenario, seed)
            .ok_or_else(|| anyhow!("Scenario '{}' not registered", self.config.scenario))?;

        let mut decisions = 0u32;
        while !battle.is_over() {
            self.check_decision_limit(decisions)?;
            self.step(&mut battle)?;
            decisions += 1;
        }

        let outcome = if battle.won() {
            Outcome::Win
        } else if battle.lost() {
            Outcome::Loss
        } else {
            Outcome::Timeout
        };

        Ok(BattleReport {
            outcome,
            score: battle.score(),
            turns: battle.turn().min(battle.max_turns()),
            decisions,
            player_hp: battle.player().hp,
        })
    }

    /// Ask the policy for one move and apply it.
    fn step(&mut self, battle: &mut Battle) -> Result<()> {
        let action = self.policy.choose_card(battle)?;
        let target = match action {
            PlayerAction::PlayCard(_) => {
                let candidates = battle.target_candidates();
                self.policy.choose_agent_target(battle, &candidates)
            }
            PlayerAction::EndAgentTurn => 0,
        };

        battle.take_action(action, target).with_context(|| {
            format!(
                "{} policy chose {:?} (target {}) at {}",
                self.policy.name(),
                action,
                target,
                battle
            )
        })
    }

    fn check_decision_limit(&self, decisions: u32) -> Result<()> {
        if decisions >= self.config.max_decisions {
            warn!(
                "Battle exceeded {} decisions without finishing",
                self.config.max_decisions
            );
            return Err(anyhow!(
                "Battle exceeded {} decisions without finishing",
                self.config.max_decisions
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_cardbattle::register_builtin_scenarios;

    fn test_config(policy: PolicyKind) -> Config {
        Config {
            agent_id: "test".into(),
            scenario: "cultist".into(),
            policy,
            battles: 2,
            seed: 3,
            iterations: 20,
            exploration: 1.0,
            verbose: true,
            time_limit_ms: 0,
            log_level: "info".into(),
            log_interval: 0,
            max_decisions: 500,
            data_dir: String::new(),
        }
    }

    fn runner(config: Config) -> Runner {
        register_builtin_scenarios();
        let policy = build_policy(&config);
        Runner::new(config, policy).unwrap()
    }

    #[test]
    fn test_unknown_scenario_is_rejected() {
        register_builtin_scenarios();
        let mut config = test_config(PolicyKind::Random);
        config.scenario = "no_such_fight".into();
        let policy = build_policy(&config);
        let err = Runner::new(config, policy).err().unwrap();
        assert!(err.to_string().contains("no_such_fight"));
    }

    #[test]
    fn test_random_battle_finishes() {
        let mut runner = runner(test_config(PolicyKind::Random));
        let report = runner.play_battle(0).unwrap();

        assert!(report.decisions > 0);
        assert!(report.turns >= 1);
        assert!((0.0..=1.0).contains(&report.score));
        match report.outcome {
            Outcome::Win => assert!(report.score >= 0.5),
            Outcome::Loss => assert_eq!(report.player_hp, 0),
            Outcome::Timeout => assert!(report.player_hp > 0),
        }
    }

    #[test]
    fn test_mcts_battle_finishes() {
        let mut runner = runner(test_config(PolicyKind::Mcts));
        let report = runner.play_battle(0).unwrap();
        assert!(report.decisions > 0);

        let (searches, _) = runner.policy.take_search_totals();
        assert!(searches > 0);
    }

    #[test]
    fn test_decision_limit_abandons_battle() {
        let mut config = test_config(PolicyKind::Random);
        config.max_decisions = 1;
        let mut runner = runner(config);

        let err = runner.play_battle(0).unwrap_err();
        assert!(err.to_string().contains("exceeded 1 decisions"));
    }

    #[test]
    fn test_run_records_every_battle() {
        let mut config = test_config(PolicyKind::Random);
        config.battles = 4;
        let mut runner = runner(config);
        runner.run().unwrap();

        let snapshot = runner.stats().snapshot();
        assert_eq!(snapshot.battles + snapshot.abandoned, 4);
        assert_eq!(snapshot.abandoned, 0);
        assert_eq!(
            snapshot.wins + snapshot.losses + snapshot.timeouts,
            snapshot.battles
        );
        assert_eq!(snapshot.policy, "random");
    }

    #[test]
    fn test_run_counts_abandoned_battles() {
        let mut config = test_config(PolicyKind::Random);
        config.battles = 3;
        config.max_decisions = 1;
        let mut runner = runner(config);
        runner.run().unwrap();

        let snapshot = runner.stats().snapshot();
        assert_eq!(snapshot.battles, 0);
        assert_eq!(snapshot.abandoned, 3);
    }

    #[test]
    fn test_same_seed_same_battle() {
        let config = test_config(PolicyKind::Random);
        let a = runner(config.clone()).play_battle(1).unwrap();
        let b = runner(config).play_battle(1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mcts_battle_deals_damage() {
        let mut config = test_config(PolicyKind::Mcts);
        config.iterations = 60;
        let mut runner = runner(config);
        let report = runner.play_battle(0).unwrap();
        assert!(report.score > 0.0);
    }
}
