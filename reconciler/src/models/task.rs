//! Task models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task Marathon launched for an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,

    pub app_id: String,

    pub host: String,

    pub ports: Vec<u32>,

    pub started_at: Option<DateTime<Utc>>,

    pub staged_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Whether the task made it past staging
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }
}
