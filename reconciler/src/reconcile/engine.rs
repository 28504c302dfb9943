//! Reconciliation engine

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::errors::ReconcileError;
use crate::models::{AppSpec, Presence, RemoteAppState};
use crate::reconcile::diff::{diff, Drift};
use crate::reconcile::fsm::{ReconcileEvent, ReconcileFsm, ReconcilePhase};
use crate::reconcile::waiter::DeploymentWaiter;
use crate::store::{Lookup, RemoteAppStore};

/// Result of a successful reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentOutcome {
    /// Whether the remote state was mutated
    pub changed: bool,

    /// Last observed state, absent after a delete or an unwaited mutation
    pub final_state: Option<RemoteAppState>,

    /// Terminal phase reached
    pub phase: ReconcilePhase,

    /// Field that triggered an update
    pub drift: Option<Drift>,
}

impl DeploymentOutcome {
    fn unchanged(final_state: Option<RemoteAppState>) -> Self {
        Self {
            changed: false,
            final_state,
            phase: ReconcilePhase::Unchanged,
            drift: None,
        }
    }
}

/// Drives one app towards its declaration
pub struct ReconcileEngine {
    store: Arc<dyn RemoteAppStore>,
    waiter: DeploymentWaiter,
}

impl ReconcileEngine {
    pub fn new(store: Arc<dyn RemoteAppStore>, waiter: DeploymentWaiter) -> Self {
        Self { store, waiter }
    }

    /// Bring the app declared by `desired` into the `presence` state.
    ///
    /// Mutations are never retried. A wait that times out is an error even
    /// though the mutation itself was applied.
    pub async fn reconcile(
        &self,
        desired: &AppSpec,
        presence: Presence,
    ) -> Result<DeploymentOutcome, ReconcileError> {
        let mut fsm = ReconcileFsm::new();

        let result = self.drive(&mut fsm, desired, presence).await;

        if let Err(e) = &result {
            let event = match (fsm.phase(), e) {
                (ReconcilePhase::Waiting, ReconcileError::TimeoutError(_)) => {
                    ReconcileEvent::DeadlineExceeded
                }
                _ => ReconcileEvent::Error(e.to_string()),
            };
            if let Err(invalid) = fsm.process(event) {
                warn!("{}", invalid);
            }
            error!(
                "Reconciling {} failed in phase {:?}: {}",
                desired.id,
                fsm.phase(),
                e
            );
        }
        debug!("Phases for {}: {:?}", desired.id, fsm.history());

        result
    }

    async fn drive(
        &self,
        fsm: &mut ReconcileFsm,
        desired: &AppSpec,
        presence: Presence,
    ) -> Result<DeploymentOutcome, ReconcileError> {
        step(fsm, ReconcileEvent::Fetch)?;
        info!("Reconciling {} towards {:?}", desired.id, presence);

        let current = self.store.get(&desired.id).await?;

        match (presence, current) {
            (Presence::Present, Lookup::NotFound) => {
                step(fsm, ReconcileEvent::Missing)?;
                info!("Creating {}", desired.id);
                self.store.create(desired).await?;
                step(fsm, ReconcileEvent::Accepted)?;

                self.await_rollout(fsm, desired, None, None).await
            }

            (Presence::Present, Lookup::Found(actual)) => match diff(desired, &actual) {
                None => {
                    step(fsm, ReconcileEvent::InSync)?;
                    info!("{} is up to date (version {})", desired.id, actual.version);
                    Ok(DeploymentOutcome::unchanged(Some(actual)))
                }
                Some(drift) => {
                    step(fsm, ReconcileEvent::Drifted)?;
                    info!(
                        "Updating {} from version {}, {} differs",
                        desired.id, actual.version, drift
                    );
                    self.store.update(&desired.id, desired).await?;
                    step(fsm, ReconcileEvent::Accepted)?;

                    self.await_rollout(fsm, desired, Some(&actual.version), Some(drift))
                        .await
                }
            },

            (Presence::Absent, Lookup::Found(actual)) => {
                step(fsm, ReconcileEvent::RemovalRequested)?;
                info!("Deleting {} (version {})", desired.id, actual.version);
                self.store.delete(&desired.id).await?;
                step(fsm, ReconcileEvent::Accepted)?;

                Ok(DeploymentOutcome {
                    changed: fsm.phase().is_change(),
                    final_state: None,
                    phase: fsm.phase(),
                    drift: None,
                })
            }

            (Presence::Absent, Lookup::NotFound) => {
                step(fsm, ReconcileEvent::InSync)?;
                info!("{} is already absent", desired.id);
                Ok(DeploymentOutcome::unchanged(None))
            }
        }
    }

    async fn await_rollout(
        &self,
        fsm: &mut ReconcileFsm,
        desired: &AppSpec,
        previous_version: Option<&str>,
        drift: Option<Drift>,
    ) -> Result<DeploymentOutcome, ReconcileError> {
        let convergence = self
            .waiter
            .wait(
                self.store.as_ref(),
                &desired.id,
                previous_version,
                desired.instances,
                self.waiter.deadline(),
            )
            .await?;
        step(fsm, ReconcileEvent::RolledOut)?;

        Ok(DeploymentOutcome {
            changed: fsm.phase().is_change(),
            final_state: convergence.into_state(),
            phase: fsm.phase(),
            drift,
        })
    }
}

fn step(fsm: &mut ReconcileFsm, event: ReconcileEvent) -> Result<ReconcilePhase, ReconcileError> {
    fsm.process(event).map_err(ReconcileError::Internal)
}
