//! Finite State Machine for one reconciliation

use serde::{Deserialize, Serialize};

/// Reconciliation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePhase {
    /// Initial state, nothing fetched yet
    Pending,

    /// Looking up the current app
    Fetching,

    /// Creating a missing app
    Creating,

    /// Replacing a drifted app definition
    Updating,

    /// Destroying an app that should be absent
    Deleting,

    /// Polling until the deployment rolled out
    Waiting,

    /// Nothing to do, the app already matches
    Unchanged,

    /// The app was destroyed
    Deleted,

    /// The deployment rolled out, or waiting was disabled
    Converged,

    /// The deployment did not roll out before the deadline
    TimedOut,

    /// A store call or the input failed
    Failed,
}

impl ReconcilePhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReconcilePhase::Unchanged
                | ReconcilePhase::Deleted
                | ReconcilePhase::Converged
                | ReconcilePhase::TimedOut
                | ReconcilePhase::Failed
        )
    }

    /// Whether reaching this phase means the remote state was mutated
    pub fn is_change(self) -> bool {
        matches!(self, ReconcilePhase::Deleted | ReconcilePhase::Converged)
    }
}

/// Reconciliation event
#[derive(Debug, Clone)]
pub enum ReconcileEvent {
    /// Start the lookup
    Fetch,

    /// The app does not exist and should
    Missing,

    /// The app exists and differs from the declaration
    Drifted,

    /// The app exists and should not
    RemovalRequested,

    /// The app is already in the declared state
    InSync,

    /// The store accepted the mutation
    Accepted,

    /// The new version rolled out
    RolledOut,

    /// The wait deadline passed
    DeadlineExceeded,

    /// Any failure
    Error(String),
}

/// Reconciliation FSM
#[derive(Debug, Clone)]
pub struct ReconcileFsm {
    phase: ReconcilePhase,
    error: Option<String>,
    history: Vec<ReconcilePhase>,
}

impl ReconcileFsm {
    /// Create a new FSM in pending state
    pub fn new() -> Self {
        Self {
            phase: ReconcilePhase::Pending,
            error: None,
            history: vec![ReconcilePhase::Pending],
        }
    }

    /// Get current phase
    pub fn phase(&self) -> ReconcilePhase {
        self.phase
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every phase visited, in order
    pub fn history(&self) -> &[ReconcilePhase] {
        &self.history
    }

    /// Process an event and transition phase
    pub fn process(&mut self, event: ReconcileEvent) -> Result<ReconcilePhase, String> {
        use ReconcileEvent as E;
        use ReconcilePhase as P;

        let next = match (self.phase, &event) {
            (P::Pending, E::Fetch) => P::Fetching,

            (P::Fetching, E::Missing) => P::Creating,
            (P::Fetching, E::Drifted) => P::Updating,
            (P::Fetching, E::RemovalRequested) => P::Deleting,
            (P::Fetching, E::InSync) => P::Unchanged,

            (P::Creating | P::Updating, E::Accepted) => P::Waiting,
            (P::Deleting, E::Accepted) => P::Deleted,

            (P::Waiting, E::RolledOut) => P::Converged,
            (P::Waiting, E::DeadlineExceeded) => P::TimedOut,

            (phase, E::Error(err)) if !phase.is_terminal() => {
                self.error = Some(err.clone());
                P::Failed
            }

            (phase, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", phase, event));
            }
        };

        self.phase = next;
        self.history.push(next);
        Ok(next)
    }
}

impl Default for ReconcileFsm {
    fn default() -> Self {
        Self::new()
    }
}
