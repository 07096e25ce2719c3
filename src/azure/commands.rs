//! Command vectors for the az CLI

use crate::azure::runner::AZ;
use crate::core::config::PipelineEntry;

/// Extension providing the `az pipelines` command group
pub const DEVOPS_EXTENSION: &str = "azure-devops";

fn az(args: &[&str]) -> Vec<String> {
    std::iter::once(AZ)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Expand a bare organization name to its dev.azure.com URL
pub fn organization_url(organization: &str) -> String {
    if organization.starts_with("https://") || organization.starts_with("http://") {
        organization.to_string()
    } else {
        format!("https://dev.azure.com/{}", organization)
    }
}

fn scoped(mut command: Vec<String>, entry: &PipelineEntry) -> Vec<String> {
    command.extend([
        "--organization".to_string(),
        organization_url(&entry.organization),
        "--project".to_string(),
        entry.project.clone(),
    ]);
    command
}

fn json_output(mut command: Vec<String>) -> Vec<String> {
    command.extend(["--output".to_string(), "json".to_string()]);
    command
}

pub fn version() -> Vec<String> {
    az(&["version", "--output", "json"])
}

pub fn account_show() -> Vec<String> {
    az(&["account", "show", "--output", "json"])
}

pub fn extension_show() -> Vec<String> {
    az(&["extension", "show", "--name", DEVOPS_EXTENSION, "--output", "json"])
}

/// `az pipelines runs list` for one pipeline, newest first
pub fn runs_list(entry: &PipelineEntry, top: usize) -> Vec<String> {
    let mut command = scoped(az(&["pipelines", "runs", "list"]), entry);
    command.extend([
        "--pipeline-ids".to_string(),
        entry.pipeline_id.to_string(),
        "--top".to_string(),
        top.to_string(),
    ]);
    json_output(command)
}

/// `az pipelines run` queuing one run on `branch` with the entry's variables
pub fn run(entry: &PipelineEntry, branch: &str) -> Vec<String> {
    let mut command = scoped(az(&["pipelines", "run"]), entry);
    command.extend([
        "--id".to_string(),
        entry.pipeline_id.to_string(),
        "--branch".to_string(),
        branch.to_string(),
    ]);
    for (name, value) in &entry.variables {
        command.push("--variables".to_string());
        command.push(format!("{}={}", name, value));
    }
    json_output(command)
}

/// `az pipelines show` for the entry's definition
pub fn show(entry: &PipelineEntry) -> Vec<String> {
    let mut command = scoped(az(&["pipelines", "show"]), entry);
    command.extend(["--id".to_string(), entry.pipeline_id.to_string()]);
    json_output(command)
}

/// Current branch of a local git checkout
pub fn current_branch(path: &str) -> Vec<String> {
    ["git", "-C", path, "rev-parse", "--abbrev-ref", "HEAD"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
