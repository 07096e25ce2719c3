//! Listing recent runs of a pipeline

use crate::{
    azure::{commands, CommandExecutor},
    core::{resolve, AuthCache, CatalogConfig, ToolError},
    persistence::{self, DebugSink},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Label under which list results are dumped
pub const LIST_DUMP_LABEL: &str = "list_runs";

const LIST_SUGGESTION: &str =
    "Check if you have access to the specified Azure DevOps organization and project";

/// Runs returned for one pipeline, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunListing {
    pub success: bool,
    pub pipeline_name: String,
    pub runs: Vec<Value>,
    pub count: usize,
}

pub struct RunLister<E> {
    executor: Arc<E>,
    auth: Arc<AuthCache<E>>,
    sink: Arc<dyn DebugSink>,
}

impl<E: CommandExecutor> RunLister<E> {
    pub fn new(executor: Arc<E>, auth: Arc<AuthCache<E>>, sink: Arc<dyn DebugSink>) -> Self {
        Self { executor, auth, sink }
    }

    /// Fetch at most `top` recent runs.
    ///
    /// `top` is passed to az and also enforced here, since the CLI may
    /// return more than asked for.
    pub async fn list_runs(
        &self,
        catalog: &CatalogConfig,
        query: &str,
        top: usize,
    ) -> Result<RunListing, ToolError> {
        let entry = resolve(query, &catalog.pipelines)?.entry;

        if let Some(error) = self.auth.check().await.to_error() {
            return Err(error);
        }

        let data = self
            .executor
            .run(&commands::runs_list(entry, top))
            .await
            .map_err(|e| ToolError::from_command(e, Some(LIST_SUGGESTION)))?;

        persistence::record(self.sink.as_ref(), LIST_DUMP_LABEL, &data).await;

        let mut runs = match data {
            Value::Array(runs) => runs,
            other => {
                warn!("Expected a list of runs for {}, got: {}", entry.name, other);
                Vec::new()
            }
        };
        if runs.len() > top {
            debug!("Truncating {} runs to {}", runs.len(), top);
            runs.truncate(top);
        }

        Ok(RunListing {
            success: true,
            pipeline_name: entry.name.clone(),
            count: runs.len(),
            runs,
        })
    }
}
