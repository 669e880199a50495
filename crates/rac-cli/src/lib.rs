//! RAC journey simulator CLI library.
//!
//! This crate provides the CLI interface for the RAC journey simulator.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EventsArgs, ImportArgs, SimulateArgs, TrainArgs};
pub use config::Config;
