//! Remote app store
//!
//! The engine only talks to Marathon through [`RemoteAppStore`], which keeps
//! it testable against an in-memory fake.

pub mod convert;
pub mod marathon;

use async_trait::async_trait;

use crate::errors::ReconcileError;
use crate::models::{AppSpec, RemoteAppState, TaskRecord};

pub use marathon::MarathonClient;

/// Result of a lookup by id
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

/// Store holding the authoritative app state
#[async_trait]
pub trait RemoteAppStore: Send + Sync {
    /// Fetch the current state of an app
    async fn get(&self, id: &str) -> Result<Lookup<RemoteAppState>, ReconcileError>;

    /// Create an app. Fails if it already exists.
    async fn create(&self, spec: &AppSpec) -> Result<(), ReconcileError>;

    /// Replace the definition of an existing app
    async fn update(&self, id: &str, spec: &AppSpec) -> Result<(), ReconcileError>;

    /// Destroy an app and its tasks
    async fn delete(&self, id: &str) -> Result<(), ReconcileError>;

    /// List the tasks of an app
    async fn list_tasks(&self, app_id: &str) -> Result<Vec<TaskRecord>, ReconcileError>;

    /// List the version tokens an app went through, newest first
    async fn list_versions(&self, app_id: &str) -> Result<Vec<String>, ReconcileError>;
}
