//! Single invocation run

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::config::params::ModuleParams;
use crate::errors::ReconcileError;
use crate::normalize::normalize;
use crate::reconcile::{DeploymentOutcome, DeploymentWaiter, ReconcileEngine};
use crate::report::ReportSink;
use crate::store::{MarathonClient, RemoteAppStore};

/// Reconcile the declared app against Marathon and report the result
pub async fn run_module(
    params: &ModuleParams,
    sink: &mut dyn ReportSink,
) -> Result<DeploymentOutcome, ReconcileError> {
    let options = AppOptions::from_params(params);

    let client = match MarathonClient::new(&options.marathon_url, options.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            sink.fail(&e.to_string())?;
            return Err(e);
        }
    };
    info!("Using Marathon at {}", client.base_url());

    run(params, &options, Arc::new(client), sink).await
}

/// Reconcile against `store` and report the result through `sink`.
///
/// Every failure is reported before it is returned.
pub async fn run(
    params: &ModuleParams,
    options: &AppOptions,
    store: Arc<dyn RemoteAppStore>,
    sink: &mut dyn ReportSink,
) -> Result<DeploymentOutcome, ReconcileError> {
    let result = apply(params, options, store).await;

    match &result {
        Ok(outcome) => sink.succeed(outcome.changed, outcome.final_state.as_ref())?,
        Err(e) => sink.fail(&e.to_string())?,
    }

    result
}

async fn apply(
    params: &ModuleParams,
    options: &AppOptions,
    store: Arc<dyn RemoteAppStore>,
) -> Result<DeploymentOutcome, ReconcileError> {
    let desired = normalize(params)?;

    let engine = ReconcileEngine::new(store, DeploymentWaiter::new(options.waiter.clone()));
    engine.reconcile(&desired, params.state).await
}
