//! MCTS configuration parameters.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by [`MctsConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("iterations must be greater than 0")]
    ZeroIterations,

    #[error("exploration constant must be a finite non-negative number, got {0}")]
    InvalidExploration(f32),
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of select/expand/rollout/backpropagate iterations per search.
    pub iterations: u32,

    /// UCB1 exploration constant `C`.
    /// 0.0 degenerates to pure exploitation of the best mean outcome.
    pub exploration: f32,

    /// Emit per-child visit counts and mean outcomes after each search.
    pub verbose: bool,

    /// Optional wall-clock budget, checked between iterations.
    /// When set, the search stops at the first iteration boundary past the
    /// deadline, but always completes at least one iteration.
    pub time_limit: Option<Duration>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            exploration: 1.0,
            verbose: false,
            time_limit: None,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 50,
            exploration: 1.0,
            verbose: false,
            time_limit: None,
        }
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the UCB1 exploration constant.
    pub fn with_exploration(mut self, c: f32) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: toggle post-search diagnostics.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder pattern: set a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        Ok(())
    }
}
