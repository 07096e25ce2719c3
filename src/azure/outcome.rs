//! Normalized outcome of a single external command

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result of one CLI invocation: the parsed payload or a failure.
pub type CommandResult = Result<Value, CommandError>;

/// Failure modes at the command-runner boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No candidate executable answered the version probe
    #[error("Azure CLI not found. Please install Azure CLI from https://docs.microsoft.com/en-us/cli/azure/install-azure-cli")]
    ToolUnavailable,

    /// The process exceeded its wall-clock budget and was killed
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// The process ran and exited non-zero
    #[error("{message}")]
    Failed {
        message: String,
        exit_code: Option<i32>,
    },

    /// The process could not be started at all
    #[error("Failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },
}

impl CommandError {
    /// Exit code reported by the process, if it got that far
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Turn raw stdout of a successful run into a structured payload.
///
/// Empty output becomes an empty object; anything that is not JSON is
/// wrapped as `{"output": <raw text>}` rather than treated as a failure.
pub fn parse_stdout(stdout: &str) -> Value {
    if stdout.trim().is_empty() {
        return Value::Object(Default::default());
    }

    serde_json::from_str(stdout).unwrap_or_else(|_| serde_json::json!({ "output": stdout }))
}

/// Pick the diagnostic text for a failed run: stderr if present, else stdout
pub fn failure_message(stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}
