//! Observer port - abstraction for training observation and data collection

use serde::{Deserialize, Serialize};

use crate::{Result, ports::Transition};

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// Reached the exit with every victim rescued
    Success,
    /// Walked into fire
    Failure,
    /// Hit the pipeline's step cap before a terminal state
    Truncated,
}

/// Summary of a finished episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Index of the episode (0-based)
    pub episode: usize,
    pub outcome: EpisodeOutcome,
    /// Sum of rewards collected during the episode
    pub total_reward: f64,
    pub steps: usize,
    /// Exploration rate the episode ran with
    pub epsilon: f64,
    /// Victims rescued during the episode
    pub rescued: usize,
    /// Largest |ΔQ| over the episode, when the learner exposes a table
    pub max_q_change: Option<f64>,
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(episode, step, transition)` - For each step
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once at the end
pub trait Observer: Send {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each step's learning update.
    fn on_step(&mut self, _episode: usize, _step: usize, _transition: &Transition) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes. Use this to flush files or finish
    /// progress displays.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
