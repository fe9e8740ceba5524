//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    analysis::smooth,
    ports::{EpisodeOutcome, EpisodeSummary, Observer, Transition},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
    failures: usize,
    truncated: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
            failures: 0,
            truncated: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} F:{} T:{}", self.successes, self.failures, self.truncated)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (S:{msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.outcome {
            EpisodeOutcome::Success => self.successes += 1,
            EpisodeOutcome::Failure => self.failures += 1,
            EpisodeOutcome::Truncated => self.truncated += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Logs a rolling summary every `interval` episodes
pub struct LogObserver {
    interval: usize,
    window_successes: usize,
    window_reward: f64,
    window_len: usize,
}

impl LogObserver {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            window_successes: 0,
            window_reward: 0.0,
            window_len: 0,
        }
    }
}

impl Observer for LogObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.window_len += 1;
        self.window_reward += summary.total_reward;
        if summary.outcome == EpisodeOutcome::Success {
            self.window_successes += 1;
        }

        if (summary.episode + 1).is_multiple_of(self.interval) {
            info!(
                "episodes {}-{}: success {}/{}, mean reward {:.2}, epsilon {:.3}",
                summary.episode + 1 - self.window_len,
                summary.episode,
                self.window_successes,
                self.window_len,
                self.window_reward / self.window_len as f64,
                summary.epsilon
            );
            self.window_len = 0;
            self.window_successes = 0;
            self.window_reward = 0.0;
        }
        Ok(())
    }
}

/// One row of the reward history CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub episode: usize,
    pub outcome: EpisodeOutcome,
    pub total_reward: f64,
    pub smoothed_reward: f64,
    pub steps: usize,
    pub rescued: usize,
    pub epsilon: f64,
    pub max_q_change: Option<f64>,
}

/// Writes the per-episode reward history, with a moving average column,
/// to a CSV file when training ends.
pub struct RewardCsvObserver {
    writer: csv::Writer<File>,
    window: usize,
    summaries: Vec<EpisodeSummary>,
}

impl RewardCsvObserver {
    /// Create the CSV file now so a bad path fails before training starts.
    pub fn new<P: AsRef<Path>>(path: P, window: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create reward history {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            window,
            summaries: Vec::new(),
        })
    }
}

impl Observer for RewardCsvObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.summaries.push(*summary);
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        let rewards: Vec<f64> = self.summaries.iter().map(|s| s.total_reward).collect();
        let smoothed = smooth(&rewards, self.window);
        for (summary, smoothed_reward) in self.summaries.iter().zip(smoothed) {
            self.writer.serialize(RewardRecord {
                episode: summary.episode,
                outcome: summary.outcome,
                total_reward: summary.total_reward,
                smoothed_reward,
                steps: summary.steps,
                rescued: summary.rescued,
                epsilon: summary.epsilon,
                max_q_change: summary.max_q_change,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Complete trace of a training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeTrace {
    pub episode: usize,
    pub outcome: EpisodeOutcome,
    pub total_reward: f64,
    pub steps: Vec<Transition>,
}

/// JSONL observer - Writes one JSON line per episode with every transition
pub struct JsonlObserver {
    writer: BufWriter<File>,
    current_steps: Vec<Transition>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            current_steps: Vec::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        self.current_steps.clear();
        Ok(())
    }

    fn on_step(&mut self, _episode: usize, _step: usize, transition: &Transition) -> Result<()> {
        self.current_steps.push(*transition);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let trace = EpisodeTrace {
            episode: summary.episode,
            outcome: summary.outcome,
            total_reward: summary.total_reward,
            steps: std::mem::take(&mut self.current_steps),
        };
        serde_json::to_writer(&mut self.writer, &trace)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
