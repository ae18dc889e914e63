//! Runtime engine configuration.
//!
//! Defaults come from [`constants`](crate::constants); the binary overrides
//! them from command-line flags.

use crate::constants::{DEFAULT_BOARD_SIZE, DEFAULT_SIMULATIONS, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::ConfigError;

/// Which freshly expanded child a search iteration plays its rollout from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RolloutPolicy {
    /// Always the first child in construction order.
    #[default]
    #[value(name = "first")]
    FirstChild,
    /// A uniformly random child.
    #[value(name = "random")]
    RandomChild,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Board side length; even, at least 4
    pub board_size: usize,
    /// Search iterations per computer move
    pub simulations: usize,
    pub rollout: RolloutPolicy,
    /// Seed for reproducible searches; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            simulations: DEFAULT_SIMULATIONS,
            rollout: RolloutPolicy::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_board_size(mut self, size: usize) -> Self {
        self.board_size = size;
        self
    }

    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Reject sizes without a well-defined centre and empty search budgets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_board_size(self.board_size)?;
        if self.simulations == 0 {
            return Err(ConfigError::NoSimulations);
        }
        Ok(())
    }
}

pub fn validate_board_size(size: usize) -> Result<(), ConfigError> {
    if size % 2 != 0 || !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        return Err(ConfigError::InvalidBoardSize { size });
    }
    Ok(())
}
