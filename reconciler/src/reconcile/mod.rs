//! Reconciliation module

pub mod diff;
pub mod engine;
pub mod fsm;
pub mod waiter;

pub use diff::{diff, needs_update, port_mappings_match, Drift};
pub use engine::{DeploymentOutcome, ReconcileEngine};
pub use fsm::{ReconcileEvent, ReconcileFsm, ReconcilePhase};
pub use waiter::{Convergence, DeploymentWaiter};
