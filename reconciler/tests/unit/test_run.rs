//! Invocation tests: parameters in, one report out

mod support;

use std::sync::Arc;

use marathon_reconciler::app::inspect::inspect;
use marathon_reconciler::app::options::AppOptions;
use marathon_reconciler::app::run::run;
use marathon_reconciler::config::ModuleParams;
use marathon_reconciler::errors::ReconcileError;
use marathon_reconciler::models::Presence;
use marathon_reconciler::report::JsonReportSink;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use support::{app, FakeStore, RecordingSink, Report};

fn params() -> ModuleParams {
    serde_json::from_value(json!({
        "name": "api",
        "args": ["/bin/api", "--port", "9000"],
        "cpus": 0.25,
        "memory": 64,
        "instances": 2,
        "env": {"WORKERS": 4, "DEBUG": false, "REGION": "eu-west-1"}
    }))
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_create_reports_final_state() {
    let params = params();
    let store = Arc::new(FakeStore::new());
    let mut sink = RecordingSink::default();

    let outcome = assert_ok!(
        run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await
    );

    assert_eq!(
        sink.reports,
        vec![Report::Succeeded {
            changed: true,
            final_state: outcome.final_state.clone(),
        }]
    );
    let state = outcome.final_state.unwrap();
    assert_eq!(state.app.id, "/api");
    assert_eq!(state.app.env["WORKERS"], "4");
    assert_eq!(state.app.env["DEBUG"], "false");
}

#[tokio::test]
async fn test_command_and_args_are_exclusive() {
    let mut params = params();
    params.command = Some("/bin/api --port 9000".to_string());
    let store = Arc::new(FakeStore::new());
    let mut sink = RecordingSink::default();

    let err = assert_err!(
        run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await
    );

    assert!(matches!(err, ReconcileError::ConfigError(_)));
    assert!(store.calls().is_empty());
    assert!(matches!(sink.reports.as_slice(), [Report::Failed(_)]));
}

#[tokio::test]
async fn test_invalid_resources_never_reach_the_store() {
    let mut params = params();
    params.cpus = 0.0;
    let store = Arc::new(FakeStore::new());
    let mut sink = RecordingSink::default();

    let err = assert_err!(
        run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await
    );

    assert!(matches!(err, ReconcileError::ConfigError(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_numeric_env_matches_string_env() {
    let mut declared = params();
    declared.env.insert("WORKERS".to_string(), json!("4"));
    declared.env.insert("DEBUG".to_string(), json!("false"));
    let store = Arc::new(FakeStore::with_app(&app(&declared)));

    let params = params();
    let mut sink = RecordingSink::default();
    let outcome = assert_ok!(
        run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await
    );

    assert!(!outcome.changed);
    assert!(store.mutations().is_empty());
}

#[tokio::test]
async fn test_absent_state_is_idempotent() {
    let mut params = params();
    params.state = Presence::Absent;
    let store = Arc::new(FakeStore::with_app(&app(&params)));
    let options = AppOptions::from_params(&params);

    let mut sink = RecordingSink::default();
    let first = assert_ok!(run(&params, &options, store.clone(), &mut sink).await);
    let second = assert_ok!(run(&params, &options, store.clone(), &mut sink).await);

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(store.mutations().len(), 1);
    assert_eq!(
        sink.reports,
        vec![
            Report::Succeeded {
                changed: true,
                final_state: None
            },
            Report::Succeeded {
                changed: false,
                final_state: None
            },
        ]
    );
}

#[tokio::test]
async fn test_failure_is_written_as_json_line() {
    let params = params();
    let store = Arc::new(FakeStore::new());
    store.fail_mutations("409 Conflict: App is locked by one or more deployments.");
    let mut sink = JsonReportSink::new(Vec::new());

    assert_err!(run(&params, &AppOptions::from_params(&params), store, &mut sink).await);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let report: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
    assert_eq!(report["failed"], json!(true));
    assert_eq!(report["changed"], json!(false));
    assert_eq!(
        report["msg"],
        json!("409 Conflict: App is locked by one or more deployments.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_inspection_after_create_and_update() {
    let mut params = params();
    let store = Arc::new(FakeStore::new());
    let mut sink = RecordingSink::default();

    assert_ok!(run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await);

    let inspection = assert_ok!(inspect(&*store, "api").await);
    assert_eq!(inspection.app_id, "/api");
    assert_eq!(inspection.tasks_started, 2);
    assert!(inspection.has_single_version());

    params.instances = 3;
    assert_ok!(run(&params, &AppOptions::from_params(&params), store.clone(), &mut sink).await);

    let inspection = assert_ok!(inspect(&*store, "api").await);
    assert_eq!(inspection.tasks_started, 3);
    assert!(!inspection.has_single_version());
    assert_eq!(inspection.versions, vec!["v2".to_string(), "v1".to_string()]);
}

#[tokio::test]
async fn test_inspecting_missing_app_fails() {
    let store = FakeStore::new();

    let err = assert_err!(inspect(&store, "api").await);
    assert!(matches!(err, ReconcileError::NotFound(_)));
}
