//! Command line definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_ENV_VAR;

/// Fetcher - keeps the live tracking state and its durable snapshots
#[derive(Debug, Parser)]
#[command(name = "fetcher_app", version)]
pub struct Cli {
    /// Path to the RON config file
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Restore the state, tick until a shutdown signal, write the shutdown snapshot
    Run,
    /// Print the state that would be restored, as JSON
    Inspect,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
