//! az CLI invocation: locating the executable and running commands

pub mod commands;
pub mod locator;
pub mod outcome;
pub mod runner;

use async_trait::async_trait;
pub use locator::ToolLocator;
pub use outcome::{CommandError, CommandResult};
pub use runner::AzureCliRunner;

/// Trait for command execution - allows swapping the real CLI for a script
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run one command vector and normalize its outcome
    async fn run(&self, command: &[String]) -> CommandResult;

    /// Run one command vector and return its stdout untouched.
    ///
    /// For plain-text tools such as git, whose output must not be read as
    /// JSON (a branch named `3.10` is not the number 3.1).
    async fn run_raw(&self, command: &[String]) -> Result<String, CommandError>;
}
