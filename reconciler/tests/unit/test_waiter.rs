//! Deployment waiter tests

mod support;

use std::time::Duration;

use marathon_reconciler::config::ModuleParams;
use marathon_reconciler::errors::ReconcileError;
use marathon_reconciler::reconcile::waiter::Options;
use marathon_reconciler::reconcile::{Convergence, DeploymentWaiter};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

use support::{app, observed, FakeStore, Observation};

fn waiter(interval: u64, timeout: u64) -> DeploymentWaiter {
    DeploymentWaiter::new(Options {
        enabled: true,
        interval: Duration::from_secs(interval),
        timeout: Duration::from_secs(timeout),
    })
}

#[tokio::test]
async fn test_disabled_waiter_does_not_poll() {
    let store = FakeStore::new();
    let waiter = DeploymentWaiter::new(Options {
        enabled: false,
        ..Options::default()
    });

    let result = waiter
        .wait(&store, "/web", None, 1, waiter.deadline())
        .await;

    assert_eq!(assert_ok!(result), Convergence::Skipped);
    assert_eq!(store.gets(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_converged_on_first_poll() {
    let spec = app(&ModuleParams::new("web"));
    let store = FakeStore::new();
    store.script(vec![Observation::Found(observed(&spec, "v1", 1, 0))]);

    let waiter = waiter(5, 60);
    let started = Instant::now();
    let result = waiter.wait(&store, "/web", None, 1, waiter.deadline()).await;

    let state = assert_ok!(result).into_state().unwrap();
    assert_eq!(state.version, "v1");
    assert_eq!(store.gets(), 1);
    assert_eq!(Instant::now(), started);
}

#[tokio::test(start_paused = true)]
async fn test_staged_tasks_block_convergence() {
    let spec = app(&ModuleParams::new("web"));
    let store = FakeStore::new();
    store.script(vec![
        Observation::Found(observed(&spec, "v2", 1, 1)),
        Observation::Found(observed(&spec, "v2", 0, 1)),
        Observation::Found(observed(&spec, "v2", 1, 0)),
    ]);

    let waiter = waiter(5, 60);
    let started = Instant::now();
    let result = waiter
        .wait(&store, "/web", Some("v1"), 1, waiter.deadline())
        .await;

    assert_ok!(result);
    assert_eq!(store.gets(), 3);
    assert_eq!(Instant::now() - started, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_previous_version_never_converges() {
    let spec = app(&ModuleParams::new("web"));
    let store = FakeStore::new();
    store.script(vec![
        Observation::Found(observed(&spec, "v1", 1, 0)),
        Observation::Found(observed(&spec, "v1", 1, 0)),
        Observation::Found(observed(&spec, "v1", 1, 0)),
    ]);

    let waiter = waiter(5, 10);
    let err = assert_err!(
        waiter
            .wait(&store, "/web", Some("v1"), 1, waiter.deadline())
            .await
    );

    assert!(matches!(err, ReconcileError::TimeoutError(_)));
    assert!(err.to_string().contains("version v1"));
    assert_eq!(store.gets(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_polls_are_retried() {
    let spec = app(&ModuleParams::new("web"));
    let store = FakeStore::new();
    store.script(vec![
        Observation::NotFound,
        Observation::Error("503 Service Unavailable: leader election".to_string()),
        Observation::Found(observed(&spec, "v1", 1, 0)),
    ]);

    let waiter = waiter(2, 60);
    let result = waiter.wait(&store, "/web", None, 1, waiter.deadline()).await;

    assert_ok!(result);
    assert_eq!(store.gets(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_last_sleep_is_clamped_to_deadline() {
    // the store never shows the app
    let store = FakeStore::new();

    let waiter = waiter(5, 12);
    let started = Instant::now();
    let err = assert_err!(waiter.wait(&store, "/web", None, 1, waiter.deadline()).await);

    assert!(matches!(err, ReconcileError::TimeoutError(_)));
    assert!(err.to_string().contains("app not visible yet"));

    // polls at 0, 5, 10 and 12 seconds
    assert_eq!(store.gets(), 4);
    assert_eq!(Instant::now() - started, Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_zero_instances_converge_without_tasks() {
    let mut params = ModuleParams::new("web");
    params.instances = 0;
    let spec = app(&params);
    let store = FakeStore::new();
    store.script(vec![Observation::Found(observed(&spec, "v2", 0, 0))]);

    let waiter = waiter(5, 60);
    let result = waiter
        .wait(&store, "/web", Some("v1"), 0, waiter.deadline())
        .await;

    assert_ok!(result);
}
