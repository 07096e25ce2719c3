//! Discovery of the az executable

use crate::azure::CommandError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Finds the first working az executable and remembers it.
///
/// Candidates are probed in order with `--version`. Only a successful probe is
/// memoized; when every candidate fails the next `locate` probes again.
#[derive(Debug)]
pub struct ToolLocator {
    candidates: Vec<String>,
    probe_timeout: Duration,
    resolved: Mutex<Option<String>>,
}

impl ToolLocator {
    pub fn new(candidates: Vec<String>, probe_timeout: Duration) -> Self {
        Self {
            candidates,
            probe_timeout,
            resolved: Mutex::new(None),
        }
    }

    /// Platform default search order, most common install location first
    pub fn default_candidates() -> Vec<String> {
        if cfg!(windows) {
            vec![
                r"C:\Program Files (x86)\Microsoft SDKs\Azure\CLI2\wbin\az.cmd".to_string(),
                r"C:\Program Files\Microsoft SDKs\Azure\CLI2\wbin\az.cmd".to_string(),
                "az.cmd".to_string(),
                "az".to_string(),
            ]
        } else {
            vec!["az".to_string()]
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Resolve the executable path, probing only if nothing is cached yet
    pub async fn locate(&self) -> Result<String, CommandError> {
        // Held across probing so concurrent callers wait for one probe pass
        let mut resolved = self.resolved.lock().await;
        if let Some(path) = resolved.as_ref() {
            return Ok(path.clone());
        }

        for candidate in &self.candidates {
            if self.probe(candidate).await {
                info!("Found Azure CLI at: {}", candidate);
                *resolved = Some(candidate.clone());
                return Ok(candidate.clone());
            }
        }

        error!(
            "Azure CLI not found in any of {} candidate locations",
            self.candidates.len()
        );
        Err(CommandError::ToolUnavailable)
    }

    /// Path found by an earlier `locate`, if any
    pub async fn cached(&self) -> Option<String> {
        self.resolved.lock().await.clone()
    }

    /// Drop the memoized path so the next `locate` probes again
    pub async fn forget(&self) {
        *self.resolved.lock().await = None;
    }

    async fn probe(&self, candidate: &str) -> bool {
        let status = timeout(
            self.probe_timeout,
            Command::new(candidate)
                .arg("--version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .status(),
        )
        .await;

        match status {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                debug!("Candidate {} failed to start: {}", candidate, e);
                false
            }
            Err(_) => {
                debug!("Candidate {} timed out after {:?}", candidate, self.probe_timeout);
                false
            }
        }
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new(Self::default_candidates(), Duration::from_secs(5))
    }
}
