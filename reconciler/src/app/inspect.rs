//! Post-deployment inspection
//!
//! Read-only checks used to verify a rollout from the outside: how many
//! tasks an app runs and how many versions it went through.

use serde::Serialize;

use crate::errors::ReconcileError;
use crate::models::TaskRecord;
use crate::normalize::normalize_id;
use crate::store::RemoteAppStore;

/// Snapshot of an app's tasks and version history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub app_id: String,

    /// Tasks that made it past staging
    pub tasks_started: usize,

    pub tasks: Vec<TaskRecord>,

    /// Newest first
    pub versions: Vec<String>,
}

impl Inspection {
    /// Whether the app was never updated after its creation
    pub fn has_single_version(&self) -> bool {
        self.versions.len() == 1
    }
}

/// Collect tasks and versions of `name`
pub async fn inspect(store: &dyn RemoteAppStore, name: &str) -> Result<Inspection, ReconcileError> {
    let app_id = normalize_id(name)?;

    let tasks = store.list_tasks(&app_id).await?;
    let versions = store.list_versions(&app_id).await?;

    Ok(Inspection {
        tasks_started: tasks.iter().filter(|t| t.is_started()).count(),
        tasks,
        versions,
        app_id,
    })
}
