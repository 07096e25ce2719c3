//! Test: Catalog, access and repository tools

use crate::helpers::*;
use serde_json::json;

#[tokio::test]
async fn test_list_available() {
    let h = harness(ScriptedExecutor::new());

    let listing = h.tools.list_available();

    assert_eq!(listing["total_pipelines"], 3);
    let pipelines = listing["pipelines"].as_array().unwrap();
    assert_eq!(pipelines[0]["name"], "integration-main");
    assert_eq!(pipelines[0]["has_variables"], true);
    assert_eq!(pipelines[2]["branch"], serde_json::Value::Null);
    assert_eq!(listing["config_path"], serde_json::Value::Null);
    assert!(h.executor.calls().is_empty());
}

#[tokio::test]
async fn test_list_available_empty_catalog() {
    let catalog = ado_pipelines::CatalogConfig::from_yaml("pipelines: []\n").unwrap();
    let h = harness_with(catalog, ScriptedExecutor::new());

    let listing = h.tools.list_available();

    assert_eq!(listing["success"], false);
    assert_eq!(listing["kind"], "configuration_defect");
}

#[tokio::test]
async fn test_access_reports_definition() {
    let h = harness(ScriptedExecutor::authenticated().on(
        "show",
        Ok(json!({
            "id": 43,
            "name": "integration-test",
            "queueStatus": "enabled",
            "repository": { "name": "Antares-Websites" }
        })),
    ));

    let report = h.tools.test_access("integration-test").await;

    assert_eq!(report["success"], true);
    assert_eq!(report["pipeline_info"]["id"], 43);
    assert_eq!(report["pipeline_info"]["repository"], "Antares-Websites");
    let calls = h.executor.calls_of("show");
    assert_eq!(arg(&calls[0], "--id"), Some("43"));
}

#[tokio::test]
async fn test_access_denied() {
    let h = harness(
        ScriptedExecutor::authenticated()
            .on("show", Err(failed("TF401019: pipeline 7 does not exist", 1))),
    );

    let report = h.tools.test_access("release").await;

    assert_eq!(report["success"], false);
    assert!(report["suggestion"].as_str().unwrap().contains("permissions"));
}

#[tokio::test]
async fn test_list_repositories() {
    let h = harness(ScriptedExecutor::new());

    let listing = h.tools.list_repositories();

    assert_eq!(listing["total_repositories"], 1);
    assert_eq!(listing["repositories"][0]["aliases"], json!(["websites"]));
}

#[tokio::test]
async fn test_find_repository_by_alias() {
    let h = harness(ScriptedExecutor::new());

    let found = h.tools.find_repository("WEBSITES");

    assert_eq!(found["success"], true);
    assert_eq!(found["repository"]["name"], "Antares-Websites");
    assert_eq!(found["matched_by"], "exact");
}

#[tokio::test]
async fn test_find_repository_unknown() {
    let h = harness(ScriptedExecutor::new());

    let found = h.tools.find_repository("mobile");

    assert_eq!(found["error"], "Repository 'mobile' not found in config.yaml");
    assert_eq!(found["suggestion"], "Use one of: Antares-Websites");
}

#[tokio::test]
async fn test_repository_branch() {
    let h = harness(ScriptedExecutor::new().on("git", text("main\n")));

    let branch = h.tools.repository_branch("antares").await;

    assert_eq!(branch["current_branch"], "main");
    assert_eq!(branch["path"], "/src/websites");
    assert_eq!(h.executor.count("git"), 1);
}

#[tokio::test]
async fn test_repository_branch_detached() {
    let h = harness(ScriptedExecutor::new().on("git", text("HEAD")));

    let branch = h.tools.repository_branch("websites").await;

    assert_eq!(branch["success"], false);
    assert!(branch["error"].as_str().unwrap().contains("detached HEAD"));
}
