//! API models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// App as returned by `GET /v2/apps/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    #[serde(default)]
    pub cpus: f64,

    #[serde(default)]
    pub mem: f64,

    #[serde(default)]
    pub instances: u32,

    /// Values are usually strings; secret references arrive as objects
    #[serde(default)]
    pub env: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,

    #[serde(default)]
    pub constraints: Vec<Vec<String>>,

    #[serde(default)]
    pub health_checks: Vec<HealthCheck>,

    /// Changes on every accepted mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub tasks_running: u32,

    #[serde(default)]
    pub tasks_staged: u32,

    #[serde(default)]
    pub tasks_healthy: u32,

    #[serde(default)]
    pub tasks_unhealthy: u32,
}

/// App definition sent on `POST /v2/apps` and `PUT /v2/apps/{id}`.
///
/// Never carries a `version` field: Marathon does not apply a write that
/// includes one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    pub cpus: f64,

    pub mem: f64,

    pub instances: u32,

    pub env: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,

    pub constraints: Vec<Vec<String>>,

    pub health_checks: Vec<HealthCheck>,
}

/// Container settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<Docker>,

    #[serde(default)]
    pub volumes: Vec<Volume>,
}

/// Docker settings of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docker {
    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Marathon answers `null` when no mappings are configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_mappings: Option<Vec<PortMapping>>,
}

/// Docker port mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Container volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub container_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// Health check definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_failures: Option<u32>,
}

/// Command of a COMMAND health check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCheck {
    pub value: String,
}

/// Running task of an app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    pub app_id: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub ports: Vec<u32>,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub staged_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub version: Option<String>,
}

/// `GET /v2/apps/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse {
    pub app: App,
}

/// `GET /v2/apps/{id}/tasks` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

/// `GET /v2/apps/{id}/versions` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsResponse {
    pub versions: Vec<String>,
}

/// `PUT /v2/apps/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRef {
    pub deployment_id: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
