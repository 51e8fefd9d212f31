use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task tracking and productivity dashboard CLI.
/// Data lives under ~/.teamtrack or a directory passed via --dir.
#[derive(Parser)]
#[command(name = "tt", version, about = "Team task tracking and productivity dashboard")]
pub struct Cli {
    /// Data directory holding the task and employee collections.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
