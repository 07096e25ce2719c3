//! Current branch of a configured local repository

use crate::azure::{commands, CommandExecutor};
use crate::core::{RepositoryEntry, ToolError};
use tracing::debug;

/// Read the checked-out branch of `repository` with git
pub async fn current_branch<E: CommandExecutor + ?Sized>(
    executor: &E,
    repository: &RepositoryEntry,
) -> Result<String, ToolError> {
    let output = executor
        .run_raw(&commands::current_branch(&repository.path))
        .await
        .map_err(|e| {
            ToolError::from_command(
                e,
                Some("Check that the repository path exists and is a git checkout"),
            )
        })?;

    let branch = output.trim();
    if branch.is_empty() {
        return Err(ToolError::ConfigurationDefect(format!(
            "Could not read the current branch of repository '{}' at {}",
            repository.name, repository.path
        )));
    }

    if branch == "HEAD" {
        return Err(ToolError::ConfigurationDefect(format!(
            "Repository '{}' is in detached HEAD state",
            repository.name
        )));
    }

    debug!("Repository {} is on branch {}", repository.name, branch);
    Ok(branch.to_string())
}
