//! Tool surface - the operations a transport exposes to a calling agent
//!
//! Every method returns a JSON value. Expected failures (unknown name,
//! missing login, timeouts) come back as an error object with `success:
//! false`, never as a Rust error, so the caller always has something to show.

use crate::{
    azure::{AzureCliRunner, CommandExecutor, ToolLocator},
    core::{resolve, AuthCache, AuthStage, AuthStatus, CatalogConfig, ToolError},
    execution::{self, repository, RunLister, TriggerOrchestrator, TriggerRequest},
    persistence::DebugSink,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Readiness of the local az installation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub azure_cli_installed: bool,
    pub authenticated: bool,
    pub devops_extension_installed: bool,
    pub account_info: Option<Value>,
    pub overall_status: &'static str,
    pub recommendations: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl StatusReport {
    pub fn from_status(status: &AuthStatus) -> Self {
        // A stage that timed out says nothing about the stages after it
        let failed = status.failed_stage;
        let azure_cli_installed = failed != Some(AuthStage::Cli) || status.timed_out;
        let logged_in = status.authenticated || failed == Some(AuthStage::Extension);

        let mut recommendations = Vec::new();
        if azure_cli_installed {
            recommendations.push("Azure CLI is installed".to_string());
        }
        if logged_in {
            match status.user_name() {
                Some(user) => recommendations.push(format!("Authenticated as {}", user)),
                None => recommendations.push("Authenticated".to_string()),
            }
        }
        if status.authenticated {
            recommendations.push("Azure DevOps extension is installed".to_string());
            recommendations.push("Azure CLI is ready for Azure DevOps pipeline operations".to_string());
        } else if let (Some(error), Some(suggestion)) = (&status.error, &status.suggestion) {
            recommendations.push(format!("{} {}", error, suggestion));
        }

        Self {
            azure_cli_installed,
            authenticated: logged_in,
            devops_extension_installed: status.authenticated,
            account_info: status.account.clone(),
            overall_status: if status.authenticated { "ready" } else { "not_ready" },
            recommendations,
            checked_at: status.checked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PipelineListing<'a> {
    name: &'a str,
    organization: &'a str,
    project: &'a str,
    pipeline_id: u64,
    branch: Option<&'a str>,
    has_variables: bool,
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| json!({ "success": false, "error": format!("Failed to encode response: {}", e) }))
}

fn respond<T: Serialize>(result: Result<T, ToolError>) -> Value {
    match result {
        Ok(value) => to_json(&value),
        Err(error) => to_json(&error.to_report()),
    }
}

/// All tools over one catalog and one command executor
pub struct PipelineTools<E> {
    catalog: CatalogConfig,
    executor: Arc<E>,
    auth: Arc<AuthCache<E>>,
    orchestrator: TriggerOrchestrator<E>,
    lister: RunLister<E>,
}

impl PipelineTools<AzureCliRunner> {
    /// Wire the real az runner using the catalog's settings
    pub fn with_azure_cli(catalog: CatalogConfig, sink: Arc<dyn DebugSink>) -> Self {
        let settings = &catalog.settings;
        let candidates = settings
            .cli_candidates
            .clone()
            .unwrap_or_else(ToolLocator::default_candidates);
        let locator = Arc::new(ToolLocator::new(candidates, settings.probe_timeout()));
        let runner = Arc::new(AzureCliRunner::new(locator, settings.command_timeout()));
        Self::new(catalog, runner, sink)
    }
}

impl<E: CommandExecutor> PipelineTools<E> {
    pub fn new(catalog: CatalogConfig, executor: Arc<E>, sink: Arc<dyn DebugSink>) -> Self {
        let auth = Arc::new(AuthCache::new(executor.clone(), catalog.settings.auth_ttl()));
        let orchestrator = TriggerOrchestrator::new(executor.clone(), auth.clone(), sink.clone());
        let lister = RunLister::new(executor.clone(), auth.clone(), sink);
        Self {
            catalog,
            executor,
            auth,
            orchestrator,
            lister,
        }
    }

    /// Replace the bulk-trigger early-abort heuristic
    pub fn with_abort_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.orchestrator = self.orchestrator.with_abort_predicate(predicate);
        self
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn auth(&self) -> &AuthCache<E> {
        &self.auth
    }

    /// Recent runs of a pipeline, at most `top`
    pub async fn list_runs(&self, name: &str, top: usize) -> Value {
        respond(self.lister.list_runs(&self.catalog, name, top).await)
    }

    /// Queue a pipeline `request.count` times; always a JSON array
    pub async fn trigger_bulk(&self, request: &TriggerRequest) -> Value {
        match self.orchestrator.trigger_bulk(&self.catalog, request).await {
            Ok(batch) => to_json(&batch),
            Err(error) => json!([to_json(&error.to_report())]),
        }
    }

    /// Installation, login and extension state (cached)
    pub async fn check_status(&self) -> Value {
        let status = self.auth.check().await;
        to_json(&StatusReport::from_status(&status))
    }

    pub fn list_available(&self) -> Value {
        if self.catalog.pipelines.is_empty() {
            return respond::<()>(Err(ToolError::ConfigurationDefect(
                "No pipelines found in config.yaml".to_string(),
            )));
        }

        let pipelines: Vec<_> = self
            .catalog
            .pipelines
            .iter()
            .map(|p| PipelineListing {
                name: &p.name,
                organization: &p.organization,
                project: &p.project,
                pipeline_id: p.pipeline_id,
                branch: p.default_branch(),
                has_variables: !p.variables.is_empty(),
            })
            .collect();

        json!({
            "total_pipelines": pipelines.len(),
            "pipelines": to_json(&pipelines),
            "config_path": self.catalog.source().map(|p| p.display().to_string()),
        })
    }

    /// Fetch a pipeline definition to check it is reachable
    pub async fn test_access(&self, name: &str) -> Value {
        respond(execution::test_access(self.executor.as_ref(), &self.auth, &self.catalog, name).await)
    }

    pub async fn clear_auth_cache(&self) -> Value {
        self.auth.clear().await;
        json!({
            "success": true,
            "message": "Authentication cache cleared. Next tool call will re-check Azure CLI status."
        })
    }

    pub fn list_repositories(&self) -> Value {
        json!({
            "total_repositories": self.catalog.repositories.len(),
            "repositories": to_json(&self.catalog.repositories),
        })
    }

    pub fn find_repository(&self, name: &str) -> Value {
        respond(resolve(name, &self.catalog.repositories).map(|resolved| {
            json!({
                "success": true,
                "repository": to_json(resolved.entry),
                "matched_by": resolved.tier,
            })
        }))
    }

    /// Checked-out branch of a configured repository
    pub async fn repository_branch(&self, name: &str) -> Value {
        let result = match resolve(name, &self.catalog.repositories) {
            Ok(resolved) => {
                let repo = resolved.entry;
                repository::current_branch(self.executor.as_ref(), repo)
                    .await
                    .map(|branch| {
                        json!({
                            "success": true,
                            "repository": repo.name,
                            "path": repo.path,
                            "current_branch": branch,
                        })
                    })
            }
            Err(e) => Err(e),
        };
        respond(result)
    }
}
