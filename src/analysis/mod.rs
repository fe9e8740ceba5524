//! Reward statistics for training diagnostics

pub mod stats;

pub use stats::{RewardStats, smooth};
