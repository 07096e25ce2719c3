//! ado-pipelines - resolve, list and bulk-trigger Azure DevOps pipelines via the az CLI

pub mod azure;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod tools;

// Re-export commonly used types
pub use azure::{AzureCliRunner, CommandError, CommandExecutor, CommandResult, ToolLocator};
pub use core::{AuthCache, AuthStatus, CatalogConfig, PipelineEntry, RepositoryEntry, ToolError};
pub use execution::{RunLister, TriggerAttemptResult, TriggerOrchestrator, TriggerRequest};
pub use persistence::{DebugSink, FileDebugSink, InMemoryDebugSink};
pub use tools::PipelineTools;
