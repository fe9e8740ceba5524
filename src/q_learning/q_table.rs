//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use crate::{
    config::LearningConfig,
    grid::{Action, State},
};

/// Per-action value estimates for one state, indexed by [`Action::index`]
pub type ActionValues = [f64; Action::COUNT];

/// Q-table mapping (state, action) pairs to Q-values
///
/// Stored as a two-level lookup `state -> [value; 4]`. Entries that were
/// never written read as 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: HashMap<State, ActionValues>,
    learning: LearningConfig,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new(learning: LearningConfig) -> Self {
        Self {
            values: HashMap::new(),
            learning,
        }
    }

    /// Rebuild a table from stored entries
    pub fn from_entries<I>(learning: LearningConfig, entries: I) -> Self
    where
        I: IntoIterator<Item = (State, ActionValues)>,
    {
        Self {
            values: entries.into_iter().collect(),
            learning,
        }
    }

    pub fn learning(&self) -> &LearningConfig {
        &self.learning
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &State, action: Action) -> f64 {
        self.values
            .get(state)
            .map_or(0.0, |values| values[action.index()])
    }

    /// All four action values of a state
    pub fn action_values(&self, state: &State) -> ActionValues {
        self.values
            .get(state)
            .copied()
            .unwrap_or([0.0; Action::COUNT])
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: State, action: Action, value: f64) {
        self.values.entry(state).or_insert([0.0; Action::COUNT])[action.index()] = value;
    }

    /// Maximum Q-value over all actions in a state
    pub fn max_q(&self, state: &State) -> f64 {
        self.action_values(state)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action; the first maximal action in enumeration order wins ties
    pub fn greedy_action(&self, state: &State) -> Action {
        let values = self.action_values(state);
        let mut best = Action::ALL[0];
        for action in &Action::ALL[1..] {
            if values[action.index()] > values[best.index()] {
                best = *action;
            }
        }
        best
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a')·(1 − done) − Q(s,a)]
    ///
    /// Returns the updated value.
    pub fn q_learning_update(
        &mut self,
        state: State,
        action: Action,
        reward: f64,
        next_state: &State,
        done: bool,
    ) -> f64 {
        let current_q = self.get(&state, action);
        let max_next_q = if done { 0.0 } else { self.max_q(next_state) };
        let td_target = reward + self.learning.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning.learning_rate * td_error;
        self.set(state, action, new_q);
        new_q
    }

    /// Largest absolute per-entry difference between two tables, treating
    /// missing entries as zero
    pub fn max_abs_difference(&self, other: &QTable) -> f64 {
        let one_way = |a: &QTable, b: &QTable| {
            a.values
                .iter()
                .flat_map(|(state, values)| {
                    let theirs = b.action_values(state);
                    (0..Action::COUNT).map(move |i| (values[i] - theirs[i]).abs())
                })
                .fold(0.0, f64::max)
        };
        one_way(self, other).max(one_way(other, self))
    }

    /// Entries sorted by state
    pub fn sorted_entries(&self) -> Vec<(State, ActionValues)> {
        let mut entries: Vec<_> = self.values.iter().map(|(s, v)| (*s, *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of states with stored values
    pub fn size(&self) -> usize {
        self.values.len()
    }
}
