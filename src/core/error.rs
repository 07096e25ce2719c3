//! Error taxonomy surfaced by the tools

use crate::azure::CommandError;
use crate::core::AuthStage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Install guidance attached to `ToolUnavailable`
pub const INSTALL_HINT: &str =
    "Install Azure CLI from https://docs.microsoft.com/en-us/cli/azure/install-azure-cli";

/// Everything a tool call can fail with. Every variant is recoverable at the
/// process level; none of them should abort the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{kind} '{query}' not found in config.yaml")]
    NotFound {
        kind: &'static str,
        query: String,
        available: Vec<String>,
    },

    #[error("{message}")]
    NotAuthenticated {
        message: String,
        suggestion: String,
        /// Check that failed, when the error comes from the auth cache
        stage: Option<AuthStage>,
        /// Diagnostic output of the failing az command
        detail: Option<String>,
    },

    #[error("{0}")]
    ToolUnavailable(String),

    #[error("{message}")]
    Timeout {
        message: String,
        suggestion: Option<String>,
    },

    #[error("{message}")]
    ExternalCommandFailure {
        message: String,
        exit_code: Option<i32>,
        suggestion: Option<String>,
    },

    #[error("{0}")]
    ConfigurationDefect(String),
}

impl ToolError {
    /// Wrap a runner failure, attaching a suggestion for command failures
    pub fn from_command(error: CommandError, suggestion: Option<&str>) -> Self {
        match error {
            CommandError::ToolUnavailable => ToolError::ToolUnavailable(error.to_string()),
            CommandError::Timeout(_) => ToolError::Timeout {
                message: error.to_string(),
                suggestion: None,
            },
            CommandError::Failed { .. } | CommandError::Launch { .. } => {
                ToolError::ExternalCommandFailure {
                    exit_code: error.exit_code(),
                    message: error.to_string(),
                    suggestion: suggestion.map(str::to_string),
                }
            }
        }
    }

    /// Remediation the caller can act on
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ToolError::NotFound { kind, available, .. } if available.is_empty() => {
                Some(format!("No {} entries are configured in config.yaml", kind.to_lowercase()))
            }
            ToolError::NotFound { available, .. } => {
                Some(format!("Use one of: {}", available.join(", ")))
            }
            ToolError::NotAuthenticated { suggestion, .. } => Some(suggestion.clone()),
            ToolError::ToolUnavailable(_) => Some(INSTALL_HINT.to_string()),
            ToolError::ExternalCommandFailure { suggestion, .. }
            | ToolError::Timeout { suggestion, .. } => suggestion.clone(),
            ToolError::ConfigurationDefect(_) => None,
        }
    }

    /// Stable machine-readable kind
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "not_found",
            ToolError::NotAuthenticated { .. } => "not_authenticated",
            ToolError::ToolUnavailable(_) => "tool_unavailable",
            ToolError::Timeout { .. } => "timeout",
            ToolError::ExternalCommandFailure { .. } => "external_command_failure",
            ToolError::ConfigurationDefect(_) => "configuration_defect",
        }
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            success: false,
            kind: self.code().to_string(),
            error: self.to_string(),
            suggestion: self.suggestion(),
            available: match self {
                ToolError::NotFound { available, .. } => Some(available.clone()),
                _ => None,
            },
            exit_code: match self {
                ToolError::ExternalCommandFailure { exit_code, .. } => *exit_code,
                _ => None,
            },
            failed_stage: match self {
                ToolError::NotAuthenticated { stage, .. } => *stage,
                _ => None,
            },
            detail: match self {
                ToolError::NotAuthenticated { detail, .. } => detail.clone(),
                _ => None,
            },
        }
    }
}

/// Serializable form of a `ToolError`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub success: bool,

    pub kind: String,

    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<AuthStage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
