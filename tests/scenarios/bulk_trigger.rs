//! Test: Bulk trigger - ordering, early abort and pre-loop guards

use crate::helpers::*;
use ado_pipelines::TriggerRequest;

/// Every attempt runs and is reported in order
#[tokio::test]
async fn test_all_attempts_succeed_in_order() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("run", queued_run(101))
            .on("run", queued_run(102))
            .on("run", queued_run(103)),
    );

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 3)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 3);
    for (i, attempt) in batch.iter().enumerate() {
        assert_eq!(attempt["run_number"], i as u64 + 1);
        assert_eq!(attempt["success"], true);
        assert_eq!(attempt["run_id"], 101 + i as u64);
        assert_eq!(attempt["branch_used"], "main");
        assert_eq!(attempt["pipeline_name"], "integration-main");
    }
    assert_eq!(h.executor.count("run"), 3);
}

/// The trigger command carries org URL, project, id, branch and variables
#[tokio::test]
async fn test_trigger_command_shape() {
    let h = harness(ScriptedExecutor::authenticated().on("run", queued_run(1)));

    h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 1)).await;

    let calls = h.executor.calls_of("run");
    let command = &calls[0];
    assert_eq!(arg(command, "--organization"), Some("https://dev.azure.com/contoso"));
    assert_eq!(arg(command, "--project"), Some("Web"));
    assert_eq!(arg(command, "--id"), Some("42"));
    assert_eq!(arg(command, "--branch"), Some("main"));
    assert_eq!(arg(command, "--variables"), Some("ENV=qa"));
    assert_eq!(arg(command, "--output"), Some("json"));
}

/// An auth-looking failure stops the loop after recording that attempt
#[tokio::test]
async fn test_auth_failure_aborts_remaining_attempts() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("run", queued_run(201))
            .on("run", Err(failed("Unauthorized: token expired", 1)))
            .on("run", queued_run(203)),
    );

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 5)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["success"], true);
    assert_eq!(batch[1]["success"], false);
    assert_eq!(batch[1]["run_number"], 2);
    assert_eq!(batch[1]["error"], "Unauthorized: token expired");
    assert_eq!(batch[1]["exit_code"], 1);

    // Attempts 3-5 never reached az
    assert_eq!(h.executor.count("run"), 2);
}

/// Other failures are recorded and the loop keeps going
#[tokio::test]
async fn test_non_auth_failure_continues() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("run", queued_run(301))
            .on("run", Err(failed("TF401019: agent pool is offline", 1)))
            .on("run", queued_run(303)),
    );

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 3)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[1]["success"], false);
    assert_eq!(batch[2]["success"], true);
    assert_eq!(batch[2]["run_id"], 303);
}

/// The abort heuristic can be swapped out
#[tokio::test]
async fn test_custom_abort_predicate() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("run", Err(failed("Unauthorized: token expired", 1))),
    );
    let tools = h.tools.with_abort_predicate(|message| message.contains("TF400813"));

    let batch = tools.trigger_bulk(&TriggerRequest::new("integration-main", 3)).await;

    assert_eq!(batch.as_array().unwrap().len(), 3);
    assert_eq!(h.executor.count("run"), 3);
}

/// Timeouts are ordinary failures, not auth failures
#[tokio::test]
async fn test_timeout_does_not_abort() {
    let h = harness(ScriptedExecutor::authenticated().on(
        "run",
        Err(ado_pipelines::CommandError::Timeout(std::time::Duration::from_secs(30))),
    ));

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 2)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["error"], "Command timed out after 30s");
}

/// No configured branch and no override: nothing is executed
#[tokio::test]
async fn test_missing_branch_guard() {
    let h = harness(ScriptedExecutor::authenticated().on("run", queued_run(1)));

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("release", 3)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0]["kind"], "configuration_defect");
    assert!(batch[0]["error"].as_str().unwrap().contains("missing 'branch'"));
    assert!(h.executor.calls().is_empty());
}

/// An override supplies the branch the config lacks
#[tokio::test]
async fn test_branch_override() {
    let h = harness(ScriptedExecutor::authenticated().on("run", queued_run(1)));

    let batch = h
        .tools
        .trigger_bulk(&TriggerRequest::new("release", 1).with_branch("hotfix/42"))
        .await;

    assert_eq!(batch[0]["branch_used"], "hotfix/42");
    let calls = h.executor.calls_of("run");
    assert_eq!(arg(&calls[0], "--branch"), Some("hotfix/42"));
    assert_eq!(arg(&calls[0], "--organization"), Some("https://dev.azure.com/fabrikam"));
}

/// Repository context supplies the branch when there is no override
#[tokio::test]
async fn test_branch_from_repository() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("git", text("feature/checkout\n"))
            .on("run", queued_run(1)),
    );

    let batch = h
        .tools
        .trigger_bulk(&TriggerRequest::new("integration", 1).with_repository("websites"))
        .await;

    assert_eq!(batch[0]["branch_used"], "feature/checkout");
    let git = h.executor.calls_of("git");
    assert_eq!(git[0][2], "/src/websites");
}

/// A branch name that reads like a number is used as written
#[tokio::test]
async fn test_version_branch_from_repository() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("git", text("3.10\n"))
            .on("run", queued_run(1)),
    );

    let batch = h
        .tools
        .trigger_bulk(&TriggerRequest::new("integration", 2).with_repository("websites"))
        .await;

    assert_eq!(batch[0]["branch_used"], "3.10");
    for command in h.executor.calls_of("run") {
        assert_eq!(arg(&command, "--branch"), Some("3.10"));
    }
}

/// Unknown repository is reported before anything touches az
#[tokio::test]
async fn test_unknown_repository() {
    let h = harness(ScriptedExecutor::authenticated());

    let batch = h
        .tools
        .trigger_bulk(&TriggerRequest::new("integration", 1).with_repository("mobile"))
        .await;

    assert_eq!(batch.as_array().unwrap().len(), 1);
    assert_eq!(batch[0]["kind"], "not_found");
    assert_eq!(batch[0]["available"], serde_json::json!(["Antares-Websites"]));
    assert!(h.executor.calls().is_empty());
}

/// Failed login means no trigger is attempted
#[tokio::test]
async fn test_auth_failure_short_circuits() {
    let h = harness(ScriptedExecutor::logged_out().on("run", queued_run(1)));

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 4)).await;
    let batch = batch.as_array().unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0]["kind"], "not_authenticated");
    assert_eq!(batch[0]["suggestion"], "Run 'az login' to authenticate with Azure");
    assert_eq!(batch[0]["failed_stage"], "login");
    assert_eq!(batch[0]["detail"], "Please run 'az login' to setup account.");
    assert_eq!(h.executor.count("run"), 0);
    assert!(h.sink.records().await.is_empty());
}

/// Finished batches are handed to the debug sink as returned
#[tokio::test]
async fn test_batch_is_dumped() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("run", queued_run(1))
            .on("run", Err(failed("Unauthorized", 1))),
    );

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 4)).await;

    let dumps = h.sink.labelled("trigger_bulk").await;
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].payload, batch);
}

/// Zero requested runs yields an empty batch
#[tokio::test]
async fn test_zero_count() {
    let h = harness(ScriptedExecutor::authenticated().on("run", queued_run(1)));

    let batch = h.tools.trigger_bulk(&TriggerRequest::new("integration-main", 0)).await;

    assert_eq!(batch, serde_json::json!([]));
    assert_eq!(h.executor.count("run"), 0);
}
