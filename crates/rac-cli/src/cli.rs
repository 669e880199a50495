//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// RAC journey simulator.
///
/// Loads a train's passenger manifest, runs the journey station by station,
/// and reallocates berths freed by no-shows to waiting RAC passengers.
#[derive(Debug, Parser)]
#[command(name = "rac", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a train manifest document (JSON).
    Import(ImportArgs),

    /// List trains and the journey dates they have bookings for.
    Trains {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a journey from origin to destination and print each station.
    Simulate(SimulateArgs),

    /// Drive a journey interactively, one command per line on stdin.
    Session(TrainArgs),

    /// Print the journey event log as JSONL.
    Events(EventsArgs),
}

/// Selects a train run. Falls back to `train_no` / `journey_date` in config.
#[derive(Debug, Clone, Default, Args)]
pub struct TrainArgs {
    /// Train number (e.g., 12951).
    #[arg(long)]
    pub train: Option<String>,

    /// Journey date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Read the document from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Mark a passenger as a no-show before departure. Repeatable.
    #[arg(long = "no-show", value_name = "PNR")]
    pub no_show: Vec<String>,

    /// Output station reports as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Only events for this train.
    #[arg(long)]
    pub train: Option<String>,

    /// Only events for this journey date (requires --train).
    #[arg(long, requires = "train")]
    pub date: Option<NaiveDate>,
}
