//! Tunable constants for the environment and the learner
//!
//! All configuration is immutable once handed to a constructor. A JSON file
//! can override any subset of the defaults.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, grid::VictimKind};

/// Reward for each kind of transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Ordinary move onto an open cell
    pub step: f64,
    /// Move blocked by a wall or the grid edge
    pub bump: f64,
    /// Move into fire (terminal)
    pub fire: f64,
    /// Reaching the exit with every victim rescued (terminal)
    pub exit: f64,
    /// Rescuing a victim trapped next to the fire
    pub endangered_victim: f64,
    /// Rescuing a stranded victim
    pub stranded_victim: f64,
}

impl RewardConfig {
    pub fn rescue(&self, kind: VictimKind) -> f64 {
        match kind {
            VictimKind::Endangered => self.endangered_victim,
            VictimKind::Stranded => self.stranded_victim,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            ("step", self.step),
            ("bump", self.bump),
            ("fire", self.fire),
            ("exit", self.exit),
            ("endangered_victim", self.endangered_victim),
            ("stranded_victim", self.stranded_victim),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(Error::InvalidConfiguration {
                    message: format!("reward '{name}' must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step: -1.0,
            bump: -2.0,
            fire: -100.0,
            exit: 100.0,
            endangered_victim: 10.0,
            stranded_victim: 8.0,
        }
    }
}

/// Q-learning update constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
}

impl LearningConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "learning_rate must be in (0, 1], got {}",
                    self.learning_rate
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "discount_factor must be in [0, 1], got {}",
                    self.discount_factor
                ),
            });
        }
        Ok(())
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.7,
            discount_factor: 0.8,
        }
    }
}

/// Multiplicative ε decay with a lower bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationSchedule {
    /// Exploration rate of the first episode
    pub initial: f64,
    /// Factor applied to ε after every episode
    pub decay: f64,
    /// Floor below which ε never drops
    pub min: f64,
}

impl ExplorationSchedule {
    /// Schedule that keeps ε fixed at `rate`
    pub fn constant(rate: f64) -> Self {
        Self {
            initial: rate,
            decay: 1.0,
            min: rate,
        }
    }

    /// ε for the episode after one that ran with `epsilon`
    pub fn next(&self, epsilon: f64) -> f64 {
        (epsilon * self.decay).max(self.min)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.initial) || !in_unit(self.decay) || !in_unit(self.min) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "exploration initial/decay/min must lie in [0, 1], got {}/{}/{}",
                    self.initial, self.decay, self.min
                ),
            });
        }
        if self.min > self.initial {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "exploration floor {} exceeds initial rate {}",
                    self.min, self.initial
                ),
            });
        }
        Ok(())
    }
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            initial: 1.0,
            decay: 0.98,
            min: 0.1,
        }
    }
}

/// Complete mission configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub rewards: RewardConfig,
    pub learning: LearningConfig,
    pub exploration: ExplorationSchedule,
}

impl MissionConfig {
    /// Load a JSON configuration file; missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rewards.validate()?;
        self.learning.validate()?;
        self.exploration.validate()
    }
}
