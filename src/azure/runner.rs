//! az CLI subprocess runner

use crate::azure::outcome::{failure_message, parse_stdout};
use crate::azure::{CommandError, CommandExecutor, CommandResult, ToolLocator};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Logical name that gets swapped for the located executable
pub const AZ: &str = "az";

/// Runs command vectors as subprocesses with a wall-clock limit
#[derive(Debug, Clone)]
pub struct AzureCliRunner {
    locator: Arc<ToolLocator>,

    /// Timeout for a single invocation
    timeout: Duration,
}

impl AzureCliRunner {
    /// Create a runner
    ///
    /// # Arguments
    /// * `locator` - Shared locator used to resolve the `az` token
    /// * `timeout` - Limit for each command; the child is killed when exceeded
    pub fn new(locator: Arc<ToolLocator>, timeout: Duration) -> Self {
        Self { locator, timeout }
    }

    pub fn locator(&self) -> &Arc<ToolLocator> {
        &self.locator
    }

    async fn resolve_program(&self, program: &str) -> Result<String, CommandError> {
        if program == AZ {
            self.locator.locate().await
        } else {
            Ok(program.to_string())
        }
    }

    /// Spawn one command and return its stdout on a zero exit
    ///
    /// Never panics or propagates I/O errors: spawn failures, timeouts and
    /// non-zero exits all come back as `CommandError`.
    async fn execute(&self, command: &[String]) -> Result<String, CommandError> {
        let Some((first, args)) = command.split_first() else {
            return Err(CommandError::Launch {
                program: String::new(),
                reason: "empty command".to_string(),
            });
        };

        let program = self.resolve_program(first).await?;
        info!("Running: {} {}", program, args.join(" "));

        let result = timeout(
            self.timeout,
            Command::new(&program)
                .args(args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            warn!("Command timed out after {:?}: {}", self.timeout, command.join(" "));
            CommandError::Timeout(self.timeout)
        })?;

        let output = result.map_err(|e| CommandError::Launch {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = failure_message(&stderr, &stdout);
            let exit_code = output.status.code();
            warn!("Command exited with code {:?}: {}", exit_code, message);
            return Err(CommandError::Failed { message, exit_code });
        }

        debug!("Command returned {} bytes of output", output.stdout.len());
        Ok(stdout)
    }
}

#[async_trait]
impl CommandExecutor for AzureCliRunner {
    async fn run(&self, command: &[String]) -> CommandResult {
        let stdout = self.execute(command).await?;
        Ok(parse_stdout(&stdout))
    }

    async fn run_raw(&self, command: &[String]) -> Result<String, CommandError> {
        self.execute(command).await
    }
}
