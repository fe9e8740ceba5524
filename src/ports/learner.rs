//! Learner port - abstraction over agents the training pipeline can drive

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    grid::{Action, State},
    q_learning::QTable,
};

/// One observed environment transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: State,
    pub action: Action,
    pub reward: f64,
    pub next_state: State,
    pub done: bool,
}

/// Learner trait - interface between the training pipeline and an agent
///
/// # Event Sequence
///
/// For each episode the pipeline calls `select_action` and then `learn`
/// once per step, and `end_episode` after the last step (terminal or
/// truncated).
pub trait Learner: Send {
    /// Pick the next action using the learner's current exploration rate.
    fn select_action(&mut self, state: &State) -> Result<Action>;

    /// Incorporate a single transition.
    ///
    /// Returns the new value estimate for `(transition.state,
    /// transition.action)`.
    fn learn(&mut self, transition: &Transition) -> Result<f64>;

    /// Called once after each episode; exploration decay happens here.
    fn end_episode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Current exploration rate
    fn exploration_rate(&self) -> f64;

    /// Get the learner's name.
    fn name(&self) -> &str;

    /// Restart the learner's random generator from `seed`.
    ///
    /// Learners without randomness ignore it.
    fn reseed(&mut self, _seed: u64) {}

    /// The learner's value table, if it keeps one.
    ///
    /// The pipeline snapshots it around each episode for convergence checks.
    /// The default returns `None`, which disables early stopping.
    fn q_table(&self) -> Option<&QTable> {
        None
    }
}
