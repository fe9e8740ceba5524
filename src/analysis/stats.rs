//! Summary statistics and smoothing of per-episode reward totals

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of a reward series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardStats {
    pub episodes: usize,
    pub mean: f64,
    /// Sample standard deviation; zero for fewer than two episodes
    pub std_dev: f64,
    pub best: f64,
    pub worst: f64,
}

impl RewardStats {
    pub fn from_rewards(rewards: &[f64]) -> Self {
        if rewards.is_empty() {
            return Self::default();
        }
        let std_dev = if rewards.len() > 1 {
            Statistics::std_dev(rewards.iter())
        } else {
            0.0
        };
        Self {
            episodes: rewards.len(),
            mean: Statistics::mean(rewards.iter()),
            std_dev,
            best: rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst: rewards.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Centered moving average over `window` samples.
///
/// The window shrinks at both ends so the output has the same length as the
/// input. A window below 2 returns the data unchanged.
pub fn smooth(data: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || data.is_empty() {
        return data.to_vec();
    }
    let before = (window - 1) / 2;
    let after = window / 2;
    (0..data.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(data.len());
            let slice = &data[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
