//! Test: Authentication status caching

use crate::helpers::*;
use ado_pipelines::AuthCache;
use std::sync::Arc;
use std::time::Duration;

/// A second check inside the TTL is served from the cache
#[tokio::test]
async fn test_status_is_cached() {
    let h = harness(ScriptedExecutor::authenticated());

    let first = h.tools.check_status().await;
    let second = h.tools.check_status().await;

    assert_eq!(first["overall_status"], "ready");
    assert_eq!(first["checked_at"], second["checked_at"]);
    assert_eq!(h.executor.count("version"), 1);
    assert_eq!(h.executor.count("account"), 1);
    assert_eq!(h.executor.count("extension"), 1);
}

/// Trigger and list calls share one probe
#[tokio::test]
async fn test_tools_share_the_cache() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("runs list", runs(1))
            .on("run", queued_run(1)),
    );

    h.tools.list_runs("integration-main", 1).await;
    h.tools
        .trigger_bulk(&ado_pipelines::TriggerRequest::new("integration-main", 1))
        .await;
    h.tools.check_status().await;

    assert_eq!(h.executor.count("version"), 1);
}

/// Negative results are cached too
#[tokio::test]
async fn test_failure_is_cached() {
    let h = harness(ScriptedExecutor::logged_out());

    let status = h.tools.check_status().await;
    h.tools.check_status().await;

    assert_eq!(status["overall_status"], "not_ready");
    assert_eq!(status["azure_cli_installed"], true);
    assert_eq!(status["authenticated"], false);
    assert_eq!(h.executor.count("account"), 1);
    assert_eq!(h.executor.count("extension"), 0);
}

/// Clearing forces the next call to probe again
#[tokio::test]
async fn test_clear_forces_reprobe() {
    let h = harness(ScriptedExecutor::authenticated());

    h.tools.check_status().await;
    let cleared = h.tools.clear_auth_cache().await;
    h.tools.check_status().await;

    assert_eq!(cleared["success"], true);
    assert_eq!(h.executor.count("version"), 2);
}

/// An expired entry is recomputed
#[tokio::test]
async fn test_expiry_forces_reprobe() {
    let executor = Arc::new(ScriptedExecutor::authenticated());
    let cache = AuthCache::new(executor.clone(), Duration::from_millis(50));

    let first = cache.check().await;
    let again = cache.check().await;
    assert_eq!(first.checked_at, again.checked_at);
    assert_eq!(executor.count("version"), 1);

    tokio::time::sleep(Duration::from_millis(120)).await;
    let refreshed = cache.check().await;

    assert!(refreshed.authenticated);
    assert_eq!(executor.count("version"), 2);
}

/// Missing az is reported as an install problem
#[tokio::test]
async fn test_cli_missing() {
    let h = harness(
        ScriptedExecutor::new().on("version", Err(ado_pipelines::CommandError::ToolUnavailable)),
    );

    let status = h.tools.check_status().await;
    assert_eq!(status["azure_cli_installed"], false);
    assert_eq!(status["overall_status"], "not_ready");

    let batch = h
        .tools
        .trigger_bulk(&ado_pipelines::TriggerRequest::new("integration-main", 2))
        .await;
    assert_eq!(batch[0]["kind"], "tool_unavailable");
    assert!(batch[0]["suggestion"].as_str().unwrap().contains("Install Azure CLI"));
    assert_eq!(h.executor.count("account"), 0);
}

/// A CLI that hangs is reported as slow, not as missing
#[tokio::test]
async fn test_cli_timeout() {
    let h = harness(ScriptedExecutor::new().on(
        "version",
        Err(ado_pipelines::CommandError::Timeout(Duration::from_secs(30))),
    ));

    let status = h.tools.check_status().await;
    assert_eq!(status["azure_cli_installed"], true);
    assert_eq!(status["authenticated"], false);
    assert_eq!(status["overall_status"], "not_ready");

    let listing = h.tools.list_runs("integration-main", 5).await;
    assert_eq!(listing["kind"], "timeout");
    assert!(listing["error"].as_str().unwrap().contains("did not respond"));
    assert!(listing["suggestion"].as_str().unwrap().contains("command_timeout_secs"));
    assert_eq!(h.executor.count("runs list"), 0);
}
