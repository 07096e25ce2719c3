//! Bulk trigger - queue the same pipeline several times in a row

use crate::{
    azure::{commands, CommandExecutor},
    core::{resolve, AuthCache, CatalogConfig, PipelineEntry, ToolError},
    execution::repository,
    persistence::{self, DebugSink},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Label under which finished batches are dumped
pub const TRIGGER_DUMP_LABEL: &str = "trigger_bulk";

/// Decides from an error message whether further attempts are pointless
pub type AbortPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

const AUTH_SIGNALS: &[&str] = &[
    "unauthorized",
    "authentication",
    "authenticate",
    "authorization",
    "login",
    "credential",
];

/// Default abort predicate: the message mentions a login or credential problem
pub fn is_auth_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    AUTH_SIGNALS.iter().any(|signal| message.contains(signal))
}

/// Parameters of one bulk trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerRequest {
    /// Free-form pipeline name
    pub pipeline: String,

    /// Number of runs to queue
    pub count: u32,

    /// Branch override
    pub branch: Option<String>,

    /// Repository whose checked-out branch is used when no override is given
    pub repository: Option<String>,
}

impl TriggerRequest {
    pub fn new(pipeline: impl Into<String>, count: u32) -> Self {
        Self {
            pipeline: pipeline.into(),
            count,
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }
}

/// Metadata of a queued run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Option<u64>,
    pub run_name: Option<String>,
    pub state: Option<String>,
    pub created_date: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,
}

impl RunSummary {
    /// Extract the interesting fields from `az pipelines run` output
    pub fn from_value(run: &Value) -> Self {
        let text = |pointer: &str| run.pointer(pointer).and_then(Value::as_str).map(str::to_string);
        Self {
            run_id: run.get("id").and_then(Value::as_u64),
            run_name: text("/name"),
            state: text("/state"),
            created_date: text("/createdDate"),
            url: text("/url"),
            web_url: text("/_links/web/href"),
        }
    }
}

/// Outcome of a single trigger attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerAttemptResult {
    /// 1-based attempt number
    pub run_number: u32,

    pub success: bool,

    pub pipeline_name: String,

    pub pipeline_id: u64,

    pub branch_used: String,

    #[serde(flatten)]
    pub run: Option<RunSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl TriggerAttemptResult {
    fn queued(run_number: u32, entry: &PipelineEntry, branch: &str, run: RunSummary) -> Self {
        Self {
            run_number,
            success: true,
            pipeline_name: entry.name.clone(),
            pipeline_id: entry.pipeline_id,
            branch_used: branch.to_string(),
            run: Some(run),
            error: None,
            exit_code: None,
        }
    }

    fn rejected(
        run_number: u32,
        entry: &PipelineEntry,
        branch: &str,
        error: String,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            run_number,
            success: false,
            pipeline_name: entry.name.clone(),
            pipeline_id: entry.pipeline_id,
            branch_used: branch.to_string(),
            run: None,
            error: Some(error),
            exit_code,
        }
    }
}

/// Runs trigger batches
pub struct TriggerOrchestrator<E> {
    executor: Arc<E>,
    auth: Arc<AuthCache<E>>,
    sink: Arc<dyn DebugSink>,
    should_abort: AbortPredicate,
}

impl<E: CommandExecutor> TriggerOrchestrator<E> {
    pub fn new(executor: Arc<E>, auth: Arc<AuthCache<E>>, sink: Arc<dyn DebugSink>) -> Self {
        Self {
            executor,
            auth,
            sink,
            should_abort: Arc::new(is_auth_failure),
        }
    }

    /// Replace the early-abort heuristic
    pub fn with_abort_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.should_abort = Arc::new(predicate);
        self
    }

    /// Queue `request.count` runs, one after another.
    ///
    /// Branch precedence is explicit override, then the repository's current
    /// branch, then the configured default. Nothing is sent to az when the
    /// pipeline cannot be resolved, no branch can be determined, or the
    /// authentication check fails.
    ///
    /// # Errors
    /// Pre-loop failures only. Failures of individual attempts are recorded in
    /// the returned batch instead.
    pub async fn trigger_bulk(
        &self,
        catalog: &CatalogConfig,
        request: &TriggerRequest,
    ) -> Result<Vec<TriggerAttemptResult>, ToolError> {
        let entry = resolve(&request.pipeline, &catalog.pipelines)?.entry;
        let branch = self.select_branch(catalog, entry, request).await?;

        let status = self.auth.check().await;
        if let Some(error) = status.to_error() {
            warn!("Not triggering {}: {}", entry.name, error);
            return Err(error);
        }

        info!(
            "Triggering {} (id {}) {} time(s) on branch {}",
            entry.name, entry.pipeline_id, request.count, branch
        );

        let command = commands::run(entry, &branch);
        let mut batch = Vec::new();

        for run_number in 1..=request.count {
            match self.executor.run(&command).await {
                Ok(run) => {
                    batch.push(TriggerAttemptResult::queued(
                        run_number,
                        entry,
                        &branch,
                        RunSummary::from_value(&run),
                    ));
                }
                Err(e) => {
                    let message = e.to_string();
                    let abort = (self.should_abort)(&message);
                    batch.push(TriggerAttemptResult::rejected(
                        run_number,
                        entry,
                        &branch,
                        message,
                        e.exit_code(),
                    ));
                    if abort {
                        warn!(
                            "Authentication error detected, stopping bulk trigger after attempt {} of {}",
                            run_number, request.count
                        );
                        break;
                    }
                }
            }
        }

        match serde_json::to_value(&batch) {
            Ok(payload) => persistence::record(self.sink.as_ref(), TRIGGER_DUMP_LABEL, &payload).await,
            Err(e) => warn!("Failed to serialize trigger batch: {}", e),
        }

        Ok(batch)
    }

    async fn select_branch(
        &self,
        catalog: &CatalogConfig,
        entry: &PipelineEntry,
        request: &TriggerRequest,
    ) -> Result<String, ToolError> {
        if let Some(branch) = request.branch.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            return Ok(branch.to_string());
        }

        if let Some(query) = request.repository.as_deref() {
            let repository = resolve(query, &catalog.repositories)?.entry;
            return repository::current_branch(self.executor.as_ref(), repository).await;
        }

        entry.default_branch().map(str::to_string).ok_or_else(|| {
            ToolError::ConfigurationDefect(format!(
                "Pipeline '{}' missing 'branch' in config.yaml and no branch specified",
                entry.name
            ))
        })
    }
}
