//! Cached authentication and capability check

use crate::azure::{commands, CommandError, CommandExecutor};
use crate::core::ToolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Default validity window for a computed status
pub const DEFAULT_AUTH_TTL: Duration = Duration::from_secs(300);

/// Suggestion attached to any stage that ran out of time
pub const TIMEOUT_SUGGESTION: &str =
    "Check network connectivity to Azure, or raise settings.command_timeout_secs in config.yaml";

/// Verification stage that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    /// The az executable runs
    Cli,
    /// An account is logged in
    Login,
    /// The azure-devops extension is installed
    Extension,
}

impl AuthStage {
    pub fn message(self) -> &'static str {
        match self {
            AuthStage::Cli => "Azure CLI not found. Please install Azure CLI first.",
            AuthStage::Login => "Not logged into Azure CLI. Please run 'az login' first.",
            AuthStage::Extension => "Azure DevOps extension not installed.",
        }
    }

    /// What the stage was doing, for timeout messages
    pub fn activity(self) -> &'static str {
        match self {
            AuthStage::Cli => "checking its version",
            AuthStage::Login => "checking the signed-in account",
            AuthStage::Extension => "checking the azure-devops extension",
        }
    }

    pub fn suggestion(self) -> &'static str {
        match self {
            AuthStage::Cli => {
                "Visit https://docs.microsoft.com/en-us/cli/azure/install-azure-cli"
            }
            AuthStage::Login => "Run 'az login' to authenticate with Azure",
            AuthStage::Extension => {
                "Run 'az extension add --name azure-devops' to install the extension"
            }
        }
    }
}

/// Outcome of one verification pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,

    /// First stage that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<AuthStage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Output of the failing command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// The failing stage did not answer within the command timeout
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,

    /// `az account show` payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Value>,

    /// `az extension show` payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Value>,

    /// Wall-clock time of the check
    pub checked_at: DateTime<Utc>,

    #[serde(skip)]
    computed_at: Instant,
}

impl AuthStatus {
    fn passed(account: Value, extension: Value) -> Self {
        Self {
            authenticated: true,
            failed_stage: None,
            error: None,
            suggestion: None,
            detail: None,
            timed_out: false,
            account: Some(account),
            extension: Some(extension),
            checked_at: Utc::now(),
            computed_at: Instant::now(),
        }
    }

    /// A slow CLI is reported as such rather than as a missing install or login
    fn failed(stage: AuthStage, cause: &CommandError, account: Option<Value>) -> Self {
        let timed_out = matches!(cause, CommandError::Timeout(_));
        let (error, suggestion) = if timed_out {
            (
                format!("Azure CLI did not respond while {}", stage.activity()),
                TIMEOUT_SUGGESTION.to_string(),
            )
        } else {
            (stage.message().to_string(), stage.suggestion().to_string())
        };

        Self {
            authenticated: false,
            failed_stage: Some(stage),
            error: Some(error),
            suggestion: Some(suggestion),
            detail: Some(cause.to_string()),
            timed_out,
            account,
            extension: None,
            checked_at: Utc::now(),
            computed_at: Instant::now(),
        }
    }

    /// Age of this status
    pub fn age(&self) -> Duration {
        self.computed_at.elapsed()
    }

    /// Error to surface when a dependent operation has to stop here
    pub fn to_error(&self) -> Option<ToolError> {
        if self.authenticated {
            return None;
        }
        let message = self.error.clone().unwrap_or_else(|| "Not authenticated".to_string());
        let suggestion = self.suggestion.clone().unwrap_or_default();
        Some(match self.failed_stage {
            _ if self.timed_out => ToolError::Timeout {
                message: match &self.detail {
                    Some(detail) => format!("{} ({})", message, detail),
                    None => message,
                },
                suggestion: Some(suggestion),
            },
            Some(AuthStage::Cli) => ToolError::ToolUnavailable(message),
            stage => ToolError::NotAuthenticated {
                message,
                suggestion,
                stage,
                detail: self.detail.clone(),
            },
        })
    }

    /// Signed-in user name from the account payload
    pub fn user_name(&self) -> Option<&str> {
        self.account.as_ref()?.pointer("/user/name")?.as_str()
    }
}

/// Memoizes the last `AuthStatus` for `ttl`.
///
/// Negative results are cached too, so a missing login is not re-probed on
/// every call until the window lapses or `clear` is called.
pub struct AuthCache<E> {
    executor: Arc<E>,
    ttl: Duration,
    entry: Mutex<Option<AuthStatus>>,
}

impl<E: CommandExecutor> AuthCache<E> {
    pub fn new(executor: Arc<E>, ttl: Duration) -> Self {
        Self {
            executor,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached status if still inside the window, else a fresh verification
    pub async fn check(&self) -> AuthStatus {
        let mut entry = self.entry.lock().await;

        if let Some(status) = entry.as_ref() {
            if status.age() < self.ttl {
                info!("Using cached authentication status");
                return status.clone();
            }
        }

        info!("Checking Azure CLI authentication (not cached)");
        let status = self.verify().await;
        *entry = Some(status.clone());
        status
    }

    /// Forget the cached status; the next `check` re-verifies
    pub async fn clear(&self) {
        *self.entry.lock().await = None;
    }

    /// Peek at the cached status without verifying
    pub async fn cached(&self) -> Option<AuthStatus> {
        self.entry.lock().await.clone()
    }

    async fn verify(&self) -> AuthStatus {
        if let Err(e) = self.executor.run(&commands::version()).await {
            warn!("Azure CLI check failed: {}", e);
            return AuthStatus::failed(AuthStage::Cli, &e, None);
        }

        let account = match self.executor.run(&commands::account_show()).await {
            Ok(account) => account,
            Err(e) => {
                warn!("Azure CLI login check failed: {}", e);
                return AuthStatus::failed(AuthStage::Login, &e, None);
            }
        };

        match self.executor.run(&commands::extension_show()).await {
            Ok(extension) => AuthStatus::passed(account, extension),
            Err(e) => {
                warn!("Azure DevOps extension check failed: {}", e);
                AuthStatus::failed(AuthStage::Extension, &e, Some(account))
            }
        }
    }
}
