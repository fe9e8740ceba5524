//! Mission command - Replay a trained table greedily

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        commands::resolve_layout,
        output::{print_kv, print_section, print_subsection},
    },
    config::MissionConfig,
    grid::{GridEnvironment, Level},
    pipeline::{MissionReport, MissionStatus, run_mission},
    q_learning::QLearningAgent,
};

#[derive(Parser, Debug)]
#[command(about = "Run one greedy mission with a trained table")]
pub struct MissionArgs {
    /// Mission level to play (not needed with --layout)
    #[arg(long, short = 'l', required_unless_present = "layout")]
    pub level: Option<Level>,

    /// Trained table (defaults to q_table_<level>.msgpack)
    #[arg(long, short = 't')]
    pub table: Option<PathBuf>,

    /// Custom layout file the table was trained on
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Step cap for the mission
    #[arg(long, default_value_t = 100)]
    pub max_steps: usize,

    /// JSON config whose rewards are used to score the mission
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only print the summary, not every frame
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,

    /// Optional path for writing the mission report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn print_frames(report: &MissionReport, env: &GridEnvironment) {
    let layout = env.layout();
    print_subsection("Step 0 (start)");
    print!("{}", layout.render(&report.states[0]));
    for (i, (action, state)) in report.actions.iter().zip(&report.states[1..]).enumerate() {
        print_subsection(&format!("Step {}: {action}", i + 1));
        print!("{}", layout.render(state));
    }
}

pub fn execute(args: MissionArgs) -> Result<MissionReport> {
    let config = match &args.config {
        Some(path) => MissionConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MissionConfig::default(),
    };
    let layout = resolve_layout(args.level, args.layout.as_deref())?;
    let table = args
        .table
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("q_table_{}.msgpack", layout.name())));

    let agent = QLearningAgent::load(&table, &layout).with_context(|| {
        format!(
            "Cannot run mission without a trained table ({})",
            table.display()
        )
    })?;
    let mut env = GridEnvironment::new(layout, config.rewards);

    let report = run_mission(&agent, &mut env, args.max_steps)?;

    if !args.quiet {
        print_frames(&report, &env);
    }

    print_section(&report.status.to_string());
    print_kv("Level", &report.layout);
    print_kv("Steps", &report.steps().to_string());
    print_kv("Rescued", &format!("{}/{}", report.rescued, report.victims));
    print_kv("Total reward", &format!("{:.1}", report.total_reward));
    let path: Vec<String> = report.actions.iter().map(|a| a.to_string()).collect();
    print_kv("Actions", &path.join(" "));
    if report.status == MissionStatus::TimedOut {
        println!("\nThe policy did not finish within {} steps.", args.max_steps);
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(report)
}
