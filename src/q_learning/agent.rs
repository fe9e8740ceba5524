//! Q-learning agent
//!
//! Owns the Q-table, picks actions ε-greedily and applies the off-policy
//! TD update after every environment step.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Result,
    adapters::MsgPackRepository,
    config::{ExplorationSchedule, LearningConfig},
    grid::{Action, GridEnvironment, GridLayout, State},
    pipeline::{TrainingConfig, TrainingPipeline, TrainingResult},
    ports::{Learner, TableRepository, Transition},
    q_learning::q_table::QTable,
};

/// Q-learning agent (off-policy TD control)
///
/// Learns the optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action actually taken next.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    exploration: ExplorationSchedule,
    epsilon: f64,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create an agent with an empty table
    pub fn new(learning: LearningConfig, exploration: ExplorationSchedule) -> Self {
        Self::from_table(QTable::new(learning), exploration)
    }

    /// Wrap an existing table, e.g. one loaded for playback
    pub fn from_table(q_table: QTable, exploration: ExplorationSchedule) -> Self {
        Self {
            q_table,
            exploration,
            epsilon: exploration.initial,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn exploration(&self) -> &ExplorationSchedule {
        &self.exploration
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// ε-greedy action selection.
    ///
    /// With probability `exploration_rate` a uniformly random action is
    /// returned, otherwise the greedy one. A rate of zero never touches the
    /// random generator.
    pub fn choose_action(&mut self, state: &State, exploration_rate: f64) -> Result<Action> {
        if exploration_rate > 0.0 && self.rng.random::<f64>() < exploration_rate {
            Action::from_index(self.rng.random_range(0..Action::COUNT))
        } else {
            Ok(self.q_table.greedy_action(state))
        }
    }

    /// Best known action; ties go to the first action in enumeration order
    pub fn greedy_action(&self, state: &State) -> Action {
        self.q_table.greedy_action(state)
    }

    /// Apply the Q-learning update for one transition and return the new value
    pub fn update(
        &mut self,
        state: State,
        action: Action,
        reward: f64,
        next_state: &State,
        done: bool,
    ) -> f64 {
        self.q_table
            .q_learning_update(state, action, reward, next_state, done)
    }

    /// Decay epsilon after episode
    pub fn decay_epsilon(&mut self) {
        self.epsilon = self.exploration.next(self.epsilon);
    }

    /// Train for `num_episodes` episodes with default pipeline settings.
    pub fn train(
        &mut self,
        env: &mut GridEnvironment,
        num_episodes: usize,
    ) -> Result<TrainingResult> {
        let config = TrainingConfig {
            episodes: num_episodes,
            ..TrainingConfig::default()
        };
        TrainingPipeline::new(config).run(self, env)
    }

    /// Persist the table for `layout` to a MessagePack file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, layout: &GridLayout) -> Result<()> {
        self.save_to(&MsgPackRepository::new(), path, layout)
    }

    /// Persist the table through any table repository.
    pub fn save_to<P: AsRef<Path>>(
        &self,
        repository: &dyn TableRepository,
        path: P,
        layout: &GridLayout,
    ) -> Result<()> {
        repository.save(&self.q_table, layout, path.as_ref())
    }

    /// Load a table trained on `layout`, ready for greedy playback.
    pub fn load<P: AsRef<Path>>(path: P, layout: &GridLayout) -> Result<Self> {
        Self::load_from(&MsgPackRepository::new(), path, layout)
    }

    /// Load a table from any table repository; exploration is switched off.
    pub fn load_from<P: AsRef<Path>>(
        repository: &dyn TableRepository,
        path: P,
        layout: &GridLayout,
    ) -> Result<Self> {
        let q_table = repository.load(layout, path.as_ref())?;
        Ok(Self::from_table(q_table, ExplorationSchedule::constant(0.0)))
    }
}

impl Learner for QLearningAgent {
    fn select_action(&mut self, state: &State) -> Result<Action> {
        self.choose_action(state, self.epsilon)
    }

    fn learn(&mut self, transition: &Transition) -> Result<f64> {
        Ok(self.update(
            transition.state,
            transition.action,
            transition.reward,
            &transition.next_state,
            transition.done,
        ))
    }

    fn end_episode(&mut self) -> Result<()> {
        self.decay_epsilon();
        Ok(())
    }

    fn exploration_rate(&self) -> f64 {
        self.epsilon
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn q_table(&self) -> Option<&QTable> {
        Some(&self.q_table)
    }
}
