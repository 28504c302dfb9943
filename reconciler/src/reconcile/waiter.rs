//! Deployment completion polling

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::errors::ReconcileError;
use crate::models::RemoteAppState;
use crate::store::{Lookup, RemoteAppStore};

/// Waiter options
#[derive(Debug, Clone)]
pub struct Options {
    /// Poll for convergence after a mutation
    pub enabled: bool,

    /// Delay between polls
    pub interval: Duration,

    /// Maximum time to wait for convergence
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

/// How a wait ended
#[derive(Debug, Clone, PartialEq)]
pub enum Convergence {
    /// Waiting is disabled, nothing was polled
    Skipped,

    /// The deployment rolled out, with the state that proved it
    Converged(RemoteAppState),
}

impl Convergence {
    pub fn into_state(self) -> Option<RemoteAppState> {
        match self {
            Convergence::Skipped => None,
            Convergence::Converged(state) => Some(state),
        }
    }
}

/// Polls the store until a deployment converged or the deadline passed
#[derive(Debug, Clone, Default)]
pub struct DeploymentWaiter {
    options: Options,
}

impl DeploymentWaiter {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Deadline for a wait starting now
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.options.timeout
    }

    /// Wait for `id` to run `instances` tasks of a version other than
    /// `previous_version`.
    ///
    /// Failed polls are logged and retried; only the deadline ends the loop
    /// without convergence.
    pub async fn wait(
        &self,
        store: &dyn RemoteAppStore,
        id: &str,
        previous_version: Option<&str>,
        instances: u32,
        deadline: Instant,
    ) -> Result<Convergence, ReconcileError> {
        if !self.options.enabled {
            info!("Not waiting for deployment of {}", id);
            return Ok(Convergence::Skipped);
        }

        let started = Instant::now();
        let mut polls: u32 = 0;
        let mut last_seen = String::from("app not visible yet");

        loop {
            polls += 1;

            match store.get(id).await {
                Ok(Lookup::Found(state)) => {
                    if state.has_converged(previous_version, instances) {
                        info!(
                            "Deployment of {} converged on version {} after {} polls",
                            id, state.version, polls
                        );
                        return Ok(Convergence::Converged(state));
                    }

                    last_seen = format!(
                        "version {}, {} running, {} staged",
                        state.version, state.tasks_running, state.tasks_staged
                    );
                    debug!("Deployment of {} in progress: {}", id, last_seen);
                }
                Ok(Lookup::NotFound) => {
                    debug!("{} not visible yet", id);
                }
                Err(e) => {
                    warn!("Poll {} for {} failed: {}", polls, id, e);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ReconcileError::TimeoutError(format!(
                    "deployment of {} did not converge within {}s, last seen: {}",
                    id,
                    now.duration_since(started).as_secs(),
                    last_seen
                )));
            }

            sleep(self.options.interval.min(deadline - now)).await;
        }
    }
}
