mod cli;

use ado_pipelines::core::config::{resolve_config_path, CatalogConfig};
use ado_pipelines::{DebugSink, FileDebugSink, InMemoryDebugSink, PipelineTools, TriggerRequest};
use anyhow::{Context, Result};
use cli::output::{format_summary, format_trigger_batch, create_spinner, style, INFO};
use cli::{Cli, Command};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging on stderr; stdout carries the JSON result
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config_path = resolve_config_path(cli.config.as_deref());
    let catalog = CatalogConfig::from_file(&config_path).context("Failed to load pipeline config")?;
    info!(
        "Loaded {} pipeline(s) and {} repositor(ies) from {}",
        catalog.pipelines.len(),
        catalog.repositories.len(),
        config_path.display()
    );

    let sink: Arc<dyn DebugSink> = if cli.no_dump {
        Arc::new(InMemoryDebugSink::new())
    } else {
        Arc::new(FileDebugSink::new(catalog.responses_dir()))
    };

    let tools = PipelineTools::with_azure_cli(catalog, sink);

    let result = match &cli.command {
        Command::Runs(cmd) => tools.list_runs(&cmd.name, cmd.top).await,
        Command::Trigger(cmd) => {
            let request = TriggerRequest::from(cmd);
            let spinner = create_spinner(format!(
                "Triggering {} {} time(s)",
                style(&request.pipeline).bold(),
                request.count
            ));
            let batch = tools.trigger_bulk(&request).await;
            spinner.finish_and_clear();
            eprintln!("{}", format_trigger_batch(&batch));
            batch
        }
        Command::Status => tools.check_status().await,
        Command::List => tools.list_available(),
        Command::TestAccess(cmd) => tools.test_access(&cmd.name).await,
        Command::ClearCache => tools.clear_auth_cache().await,
        Command::Repos => tools.list_repositories(),
        Command::Repo(cmd) => tools.find_repository(&cmd.name),
        Command::RepoBranch(cmd) => tools.repository_branch(&cmd.name).await,
    };

    if !matches!(cli.command, Command::Trigger(_)) {
        eprintln!("{}", format_summary(&result));
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    if failed(&result) {
        eprintln!("{} Exiting with status 1", INFO);
        std::process::exit(1);
    }

    Ok(())
}

/// A tool result counts as failed when it, or every attempt in a batch, failed
fn failed(result: &Value) -> bool {
    let is_failure = |v: &Value| v.get("success").and_then(Value::as_bool) == Some(false);
    match result {
        Value::Array(items) => !items.is_empty() && items.iter().all(is_failure),
        other => is_failure(other),
    }
}
