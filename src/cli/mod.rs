//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RepoCommand, RunsCommand, TestAccessCommand, TriggerCommand};
use std::path::PathBuf;

/// Azure DevOps pipeline tools backed by the az CLI
#[derive(Debug, Parser, Clone)]
#[command(name = "ado-pipelines")]
#[command(version)]
#[command(about = "Resolve, list and bulk-trigger Azure DevOps pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config.yaml
    #[arg(short, long, global = true, env = "ADO_PIPELINES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Don't write debug dumps to the responses directory
    #[arg(long, global = true)]
    pub no_dump: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List recent runs of a pipeline
    Runs(RunsCommand),

    /// Queue a pipeline several times
    Trigger(TriggerCommand),

    /// Check az installation, login and extension
    Status,

    /// List configured pipelines
    List,

    /// Check that a pipeline definition is reachable
    TestAccess(TestAccessCommand),

    /// Drop the cached authentication status
    ClearCache,

    /// List configured repositories
    Repos,

    /// Look up a repository by name or alias
    Repo(RepoCommand),

    /// Show the checked-out branch of a repository
    RepoBranch(RepoCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }
}
