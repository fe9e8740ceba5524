//! Training and playback drivers
//!
//! This module provides:
//! - The training pipeline that runs a learner through episodes
//! - Observers recording progress, logs, reward history and traces
//! - Greedy mission playback of a trained table

pub mod mission;
pub mod observers;
pub mod training;

pub use mission::{MissionReport, MissionStatus, run_mission};
pub use observers::{
    EpisodeTrace, JsonlObserver, LogObserver, ProgressObserver, RewardCsvObserver, RewardRecord,
};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Learner, Observer};
