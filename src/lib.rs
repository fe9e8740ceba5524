//! Search and rescue mission solved with tabular Q-learning
//!
//! This crate provides:
//! - A deterministic grid world with fire, victims, walls and an exit
//! - A Q-learning agent with ε-greedy exploration and a persisted Q-table
//! - A training pipeline with pluggable observers
//! - Greedy mission playback of a trained table
//! - The `rescue` command-line tool for training and playback

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use config::{ExplorationSchedule, LearningConfig, MissionConfig, RewardConfig};
pub use error::{Error, Result};
pub use grid::{Action, GridEnvironment, GridLayout, Level, State};
pub use q_learning::{QLearningAgent, QTable};
