//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    agents::AgentsArgs, config::ConfigArgs, evaluate::EvaluateArgs, level::LevelArgs,
    record::RecordArgs, threshold::ThresholdArgs,
};

#[derive(Parser, Debug)]
#[command(name = "custodes")]
#[command(about = "Custodes - adaptive thresholds and response scoring for AI agents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .custodes/config.yaml and .custodes/local.yaml)
    #[arg(short, long, global = true, env = "CUSTODES_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the adaptive pass threshold for a test
    Threshold(ThresholdArgs),

    /// Record a completed test for an agent
    Record(RecordArgs),

    /// Set an agent's progression level
    Level(LevelArgs),

    /// List known agents with their level and history
    Agents(AgentsArgs),

    /// Score free-text responses
    Evaluate(EvaluateArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}
