//! Access test against a single pipeline definition

use crate::{
    azure::{commands, CommandExecutor},
    core::{resolve, AuthCache, CatalogConfig, ToolError},
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

const ACCESS_SUGGESTION: &str = "Check if the pipeline ID, organization, and project are correct, and you have permissions";

/// Subset of `az pipelines show` worth reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineInfo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub repository: Option<String>,
    pub queue_status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl PipelineInfo {
    pub fn from_value(definition: &Value) -> Self {
        let text = |pointer: &str| {
            definition
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            id: definition.get("id").and_then(Value::as_u64),
            name: text("/name"),
            path: text("/path"),
            repository: text("/repository/name"),
            queue_status: text("/queueStatus"),
            kind: text("/type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessReport {
    pub success: bool,
    pub pipeline_name: String,
    pub pipeline_info: PipelineInfo,
}

/// Fetch the definition of the named pipeline to prove it is reachable
pub async fn test_access<E: CommandExecutor>(
    executor: &E,
    auth: &AuthCache<E>,
    catalog: &CatalogConfig,
    query: &str,
) -> Result<AccessReport, ToolError> {
    let entry = resolve(query, &catalog.pipelines)?.entry;

    if let Some(error) = auth.check().await.to_error() {
        return Err(error);
    }

    let definition = executor
        .run(&commands::show(entry))
        .await
        .map_err(|e| ToolError::from_command(e, Some(ACCESS_SUGGESTION)))?;

    info!("Pipeline {} is accessible", entry.name);
    Ok(AccessReport {
        success: true,
        pipeline_name: entry.name.clone(),
        pipeline_info: PipelineInfo::from_value(&definition),
    })
}
