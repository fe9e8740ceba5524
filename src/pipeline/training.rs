//! Training pipeline for learnable agents

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    analysis::RewardStats,
    grid::{GridEnvironment, StepEvent},
    ports::{EpisodeOutcome, EpisodeSummary, Learner, Observer, Transition},
};

/// Training configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Step cap per episode; an episode that hits it is truncated
    pub max_steps_per_episode: usize,

    /// Stop early once a successful episode changes no table entry by more
    /// than this amount
    pub convergence_threshold: Option<f64>,

    /// Reseed the learner's random generator before the first episode
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps_per_episode: 200,
            convergence_threshold: None,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps_per_episode == 0 {
            return Err(Error::InvalidConfiguration {
                message: "max_steps_per_episode must be at least 1".to_string(),
            });
        }
        match self.convergence_threshold {
            Some(threshold) if !(threshold.is_finite() && threshold >= 0.0) => {
                Err(Error::InvalidConfiguration {
                    message: format!("convergence threshold must be >= 0, got {threshold}"),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes actually run (fewer than configured after convergence)
    pub episodes: usize,
    pub successes: usize,
    pub failures: usize,
    pub truncations: usize,
    pub success_rate: f64,
    /// Total reward of every episode, in order
    pub episode_rewards: Vec<f64>,
    pub reward_stats: RewardStats,
    /// Exploration rate after the last episode
    pub final_epsilon: f64,
    /// Episode index at which the table converged, if it did
    pub converged_at: Option<usize>,
}

impl TrainingResult {
    fn from_summaries(
        summaries: &[EpisodeSummary],
        final_epsilon: f64,
        converged_at: Option<usize>,
    ) -> Self {
        let count = |outcome: EpisodeOutcome| {
            summaries.iter().filter(|s| s.outcome == outcome).count()
        };
        let successes = count(EpisodeOutcome::Success);
        let episode_rewards: Vec<f64> = summaries.iter().map(|s| s.total_reward).collect();
        let success_rate = if summaries.is_empty() {
            0.0
        } else {
            successes as f64 / summaries.len() as f64
        };

        Self {
            episodes: summaries.len(),
            successes,
            failures: count(EpisodeOutcome::Failure),
            truncations: count(EpisodeOutcome::Truncated),
            success_rate,
            reward_stats: RewardStats::from_rewards(&episode_rewards),
            episode_rewards,
            final_epsilon,
            converged_at,
        }
    }

    pub fn converged(&self) -> bool {
        self.converged_at.is_some()
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create summary {}", path.display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Drives a learner through repeated episodes of a grid environment
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run the configured number of episodes.
    ///
    /// Each episode resets the environment and loops select → step → learn
    /// until a terminal transition or the step cap. Exploration decays once
    /// per episode through [`Learner::end_episode`].
    pub fn run(
        &mut self,
        learner: &mut dyn Learner,
        env: &mut GridEnvironment,
    ) -> Result<TrainingResult> {
        self.config.validate()?;
        info!(
            "training {} on '{}' for {} episodes (max {} steps each)",
            learner.name(),
            env.layout().name(),
            self.config.episodes,
            self.config.max_steps_per_episode
        );

        if let Some(seed) = self.config.seed {
            debug!("seeding {} with {seed}", learner.name());
            learner.reseed(seed);
        }

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut summaries = Vec::with_capacity(self.config.episodes);
        let mut converged_at = None;

        for episode in 0..self.config.episodes {
            for observer in &mut self.observers {
                observer.on_episode_start(episode)?;
            }

            let summary = self.run_episode(episode, learner, env)?;
            debug!(
                "episode {episode}: {:?} reward={:.1} steps={} epsilon={:.3}",
                summary.outcome, summary.total_reward, summary.steps, summary.epsilon
            );

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            summaries.push(summary);

            let settled = match (self.config.convergence_threshold, summary.max_q_change) {
                (Some(threshold), Some(change)) => change <= threshold,
                _ => false,
            };
            if settled && summary.outcome == EpisodeOutcome::Success {
                info!("Q-values converged after episode {episode}");
                converged_at = Some(episode);
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result =
            TrainingResult::from_summaries(&summaries, learner.exploration_rate(), converged_at);
        info!(
            "training finished: {} episodes, {} successes, {} failures, {} truncated, mean reward {:.2}",
            result.episodes,
            result.successes,
            result.failures,
            result.truncations,
            result.reward_stats.mean
        );
        Ok(result)
    }

    fn run_episode(
        &mut self,
        episode: usize,
        learner: &mut dyn Learner,
        env: &mut GridEnvironment,
    ) -> Result<EpisodeSummary> {
        let before = learner.q_table().cloned();
        let epsilon = learner.exploration_rate();
        let mut state = env.reset();
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut rescued = 0;
        let mut outcome = EpisodeOutcome::Truncated;

        while steps < self.config.max_steps_per_episode {
            let action = learner.select_action(&state)?;
            let step = env.step(action)?;
            let transition = Transition {
                state,
                action,
                reward: step.reward,
                next_state: step.state,
                done: step.done,
            };
            learner.learn(&transition)?;

            for observer in &mut self.observers {
                observer.on_step(episode, steps, &transition)?;
            }

            total_reward += step.reward;
            steps += 1;
            state = step.state;
            match step.event {
                StepEvent::Rescued => rescued += 1,
                StepEvent::Escaped => outcome = EpisodeOutcome::Success,
                StepEvent::Burned => outcome = EpisodeOutcome::Failure,
                StepEvent::Bump | StepEvent::Moved => {}
            }
            if step.done {
                break;
            }
        }

        learner.end_episode()?;

        let max_q_change = match (before, learner.q_table()) {
            (Some(before), Some(after)) => Some(after.max_abs_difference(&before)),
            _ => None,
        };

        Ok(EpisodeSummary {
            episode,
            outcome,
            total_reward,
            steps,
            epsilon,
            rescued,
            max_q_change,
        })
    }
}
