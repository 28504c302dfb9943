//! Data models

pub mod app;
pub mod task;

pub use app::{
    AppSpec, Constraint, ContainerSpec, ContainerType, HealthCheck, PortMapping, Presence,
    RemoteAppState, Volume, WILDCARD_SERVICE_PORT,
};
pub use task::TaskRecord;
