use httpmock::prelude::*;
use store_smoke::{build_suites, FileConfig, SuiteRunner};

/// End-to-end through config, suite selection, and the runner, with the
/// search suite pointed at a mock server (the other stores stay untouched
/// because of --only-style selection).
#[tokio::test]
async fn test_runner_executes_selected_suite_from_config() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "version": { "number": "8.13.0" } }));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/smoke_docs/_doc/doc-1");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "result": "created" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/smoke_docs/_bulk");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "errors": false, "items": [{}, {}] }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/smoke_docs/_doc/doc-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "found": true }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/smoke_docs/_search");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "hits": { "total": { "value": 1 } } }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/smoke_docs/_count");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "count": 1 }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/smoke_docs/_update/doc-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "result": "updated" }));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/smoke_docs/_doc/doc-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "result": "deleted" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/smoke_docs/_delete_by_query");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "deleted": 1 }));
    });

    let toml = format!(
        r#"
[search]
url = "{}"
index = "smoke_docs"
"#,
        server.base_url()
    );
    let config = FileConfig::from_toml_str(&toml).unwrap();

    let suites = build_suites(&config, &["search".to_string()], &[]);
    assert_eq!(suites.len(), 1);

    let mut runner = SuiteRunner::new("test_run".to_string());
    for suite in suites {
        runner.add_suite(suite);
    }

    let reports = runner.execute_all().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].suite_name, "search");
    assert_eq!(reports[0].steps.len(), 10);

    let summary = SuiteRunner::get_execution_summary(&reports);
    assert_eq!(summary["total_suites"], serde_json::Value::Number(1.into()));
    assert_eq!(summary["total_steps"], serde_json::Value::Number(10.into()));
    assert_eq!(summary["executed_suites"][0], "search");
}

#[tokio::test]
async fn test_store_error_surfaces_with_high_severity() {
    // No mocks registered: every request is answered with an error status,
    // so the connect step already fails the run
    let server = MockServer::start();

    let mut config = FileConfig::default();
    config.search.url = server.base_url();

    let suites = build_suites(&config, &["search".to_string()], &[]);
    let mut runner = SuiteRunner::new("test_run".to_string());
    for suite in suites {
        runner.add_suite(suite);
    }

    let err = runner.execute_all().await.unwrap_err();
    assert_eq!(
        err.severity(),
        store_smoke::utils::error::ErrorSeverity::High
    );
}
