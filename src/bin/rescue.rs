//! Rescue CLI - Train a search and rescue robot and replay its missions
//!
//! This CLI provides:
//! - Training a Q-table on a built-in or custom grid
//! - Greedy mission playback of a trained table

use anyhow::Result;
use clap::{Parser, Subcommand};
use rescue::cli::commands::{mission, train};

#[derive(Parser)]
#[command(name = "rescue")]
#[command(version, about = "Search and rescue robot trained with Q-learning", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG still overrides)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-table and save it for later missions
    Train(Box<train::TrainArgs>),

    /// Load a trained table and run one greedy mission
    Mission(mission::MissionArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    rescue::logging::init(cli.verbose);

    match cli.command {
        Commands::Train(args) => train::execute(*args),
        Commands::Mission(args) => mission::execute(args).map(|_| ()),
    }
}
