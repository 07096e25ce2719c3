//! CLI command definitions

use ado_pipelines::TriggerRequest;
use clap::Args;

/// List recent runs
#[derive(Debug, Args, Clone)]
pub struct RunsCommand {
    /// Pipeline name or abbreviation
    pub name: String,

    /// Maximum number of runs to show
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,
}

/// Queue a pipeline several times
#[derive(Debug, Args, Clone)]
pub struct TriggerCommand {
    /// Pipeline name or abbreviation (e.g. 'int' for integration)
    pub name: String,

    /// Number of runs to queue
    pub count: u32,

    /// Branch override
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Use the checked-out branch of this configured repository
    #[arg(short, long, conflicts_with = "branch")]
    pub repo: Option<String>,
}

impl From<&TriggerCommand> for TriggerRequest {
    fn from(cmd: &TriggerCommand) -> Self {
        TriggerRequest {
            pipeline: cmd.name.clone(),
            count: cmd.count,
            branch: cmd.branch.clone(),
            repository: cmd.repo.clone(),
        }
    }
}

/// Check access to one pipeline
#[derive(Debug, Args, Clone)]
pub struct TestAccessCommand {
    /// Pipeline name or abbreviation
    pub name: String,
}

/// Repository lookup
#[derive(Debug, Args, Clone)]
pub struct RepoCommand {
    /// Repository name or alias
    pub name: String,
}
