//! Tabular Q-learning
//!
//! The agent keeps a table of action values per grid state and improves it
//! with the off-policy temporal difference update
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α·[r + γ·max_a' Q(s',a')·(1 − done) − Q(s,a)]
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use rescue::{
//!     config::{ExplorationSchedule, LearningConfig, RewardConfig},
//!     grid::{GridEnvironment, Level},
//!     q_learning::QLearningAgent,
//! };
//!
//! let layout = Level::Easy.layout();
//! let mut env = GridEnvironment::new(layout.clone(), RewardConfig::default());
//! let mut agent =
//!     QLearningAgent::new(LearningConfig::default(), ExplorationSchedule::default())
//!         .with_seed(7);
//!
//! agent.train(&mut env, 500)?;
//! agent.save("q_table_easy.msgpack", &layout)?;
//! # Ok::<(), rescue::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

// Public re-exports
pub use agent::QLearningAgent;
pub use q_table::{ActionValues, QTable};
pub use serialization::{SavedEntry, SavedQTable};
