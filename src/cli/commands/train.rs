//! Train command - Learn a Q-table for a mission level

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::{
    cli::{
        commands::resolve_layout,
        output::{format_number, print_kv, print_section},
    },
    config::MissionConfig,
    grid::{GridEnvironment, Level},
    pipeline::{
        JsonlObserver, LogObserver, ProgressObserver, RewardCsvObserver, TrainingConfig,
        TrainingPipeline,
    },
    q_learning::QLearningAgent,
};

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-table for a mission level")]
pub struct TrainArgs {
    /// Mission level to train on
    #[arg(long, short = 'l', default_value = "easy")]
    pub level: Level,

    /// Custom layout file (ASCII grid) used instead of the level's layout
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 1000)]
    pub episodes: usize,

    /// Step cap per episode
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// Output file for the trained table (defaults to q_table_<level>.msgpack)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// JSON file overriding rewards, learning and exploration settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Learning rate α (0.0-1.0)
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub discount: Option<f64>,

    /// Initial exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Multiplicative ε decay per episode
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Lower bound for ε
    #[arg(long)]
    pub min_epsilon: Option<f64>,

    /// Stop once a successful episode changes no Q-value by more than this
    #[arg(long)]
    pub convergence: Option<f64>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional CSV file for the per-episode reward history
    #[arg(long)]
    pub rewards_csv: Option<PathBuf>,

    /// Moving-average window for the smoothed reward column
    #[arg(long, default_value_t = 10)]
    pub smoothing_window: usize,

    /// Optional JSONL file with the full transition trace of every episode
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Log a rolling summary every N episodes
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl TrainArgs {
    fn mission_config(&self) -> Result<MissionConfig> {
        let mut config = match &self.config {
            Some(path) => MissionConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MissionConfig::default(),
        };
        if let Some(value) = self.learning_rate {
            config.learning.learning_rate = value;
        }
        if let Some(value) = self.discount {
            config.learning.discount_factor = value;
        }
        if let Some(value) = self.epsilon {
            config.exploration.initial = value;
        }
        if let Some(value) = self.epsilon_decay {
            config.exploration.decay = value;
        }
        if let Some(value) = self.min_epsilon {
            config.exploration.min = value;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.mission_config()?;
    let layout = resolve_layout(Some(args.level), args.layout.as_deref())?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("q_table_{}.msgpack", layout.name())));

    print_section(&format!("Training on '{}'", layout.name()));
    print!("{layout}");
    print_kv("Episodes", &format_number(args.episodes));
    print_kv("Learning rate", &format!("{}", config.learning.learning_rate));
    print_kv("Discount", &format!("{}", config.learning.discount_factor));
    print_kv(
        "Exploration",
        &format!(
            "{} (x{} per episode, floor {})",
            config.exploration.initial, config.exploration.decay, config.exploration.min
        ),
    );

    let mut agent = QLearningAgent::new(config.learning, config.exploration);
    let mut env = GridEnvironment::new(layout.clone(), config.rewards);

    let training = TrainingConfig {
        episodes: args.episodes,
        max_steps_per_episode: args.max_steps,
        convergence_threshold: args.convergence,
        seed: args.seed,
    };
    let mut pipeline = TrainingPipeline::new(training)
        .with_observer(Box::new(LogObserver::new(args.log_interval)));
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.rewards_csv {
        let observer = RewardCsvObserver::new(path, args.smoothing_window)?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }
    if let Some(path) = &args.trace {
        pipeline = pipeline.with_observer(Box::new(
            JsonlObserver::new(path)
                .with_context(|| format!("Failed to create trace file {}", path.display()))?,
        ));
    }

    let result = pipeline.run(&mut agent, &mut env)?;

    agent
        .save(&output, &layout)
        .with_context(|| format!("Failed to save Q-table to {}", output.display()))?;

    print_section("Training Summary");
    print_kv("Episodes run", &format_number(result.episodes));
    print_kv(
        "Successes",
        &format!("{} ({:.1}%)", result.successes, result.success_rate * 100.0),
    );
    print_kv("Failures", &result.failures.to_string());
    print_kv("Truncated", &result.truncations.to_string());
    print_kv(
        "Mean reward",
        &format!(
            "{:.2} ± {:.2}",
            result.reward_stats.mean, result.reward_stats.std_dev
        ),
    );
    print_kv("Final epsilon", &format!("{:.3}", result.final_epsilon));
    match result.converged_at {
        Some(episode) => print_kv("Converged", &format!("after episode {}", episode + 1)),
        None => print_kv("Converged", "no"),
    }
    print_kv("States learned", &format_number(agent.q_table().size()));
    print_kv("Saved table", &output.display().to_string());

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        result.save(&path)?;
        info!("wrote training summary to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_summary_path() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/run")),
            PathBuf::from("out/run.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/run.JSON")),
            PathBuf::from("out/run.JSON")
        );
        let dir = format!("out{}", std::path::MAIN_SEPARATOR);
        assert_eq!(
            sanitize_summary_path(Path::new(&dir)),
            PathBuf::from("out").join("training_summary.json")
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = TrainArgs::parse_from([
            "train",
            "--learning-rate",
            "0.3",
            "--min-epsilon",
            "0.05",
        ]);
        let config = args.mission_config().unwrap();
        assert_eq!(config.learning.learning_rate, 0.3);
        assert_eq!(config.learning.discount_factor, 0.8);
        assert_eq!(config.exploration.min, 0.05);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = TrainArgs::parse_from(["train", "--discount", "1.5"]);
        assert!(args.mission_config().is_err());
    }

    #[test]
    fn test_defaults_need_no_arguments() {
        let args = TrainArgs::parse_from(["train"]);
        assert_eq!(args.level, Level::Easy);
        assert_eq!(args.episodes, 1000);
        assert!(args.output.is_none());
    }
}
