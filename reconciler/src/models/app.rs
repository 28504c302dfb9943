//! App models
//!
//! Flat value records in canonical form. Both the desired declaration and the
//! state fetched from Marathon are brought into this shape before they are
//! compared, so equality here is the equality the diff relies on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ReconcileError;

/// Service port value meaning "let Marathon assign one"
pub const WILDCARD_SERVICE_PORT: u32 = 0;

/// Desired app, as declared by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    /// Path-like identifier, always starting with `/`
    pub id: String,

    /// Shell command, `None` when unset
    pub cmd: Option<String>,

    /// Argument vector, `None` when unset or empty
    pub args: Option<Vec<String>>,

    pub cpus: f64,

    pub mem: f64,

    pub instances: u32,

    pub env: BTreeMap<String, String>,

    pub container: ContainerSpec,

    pub constraints: Vec<Constraint>,

    pub health_checks: Vec<HealthCheck>,
}

/// Whether the app should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Present,
    Absent,
}

/// Container type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerType {
    Docker,
    Mesos,
    #[default]
    None,
}

impl ContainerType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerType::Docker => "DOCKER",
            ContainerType::Mesos => "MESOS",
            ContainerType::None => "NONE",
        }
    }
}

impl std::str::FromStr for ContainerType {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DOCKER" => Ok(ContainerType::Docker),
            "MESOS" => Ok(ContainerType::Mesos),
            "" | "NONE" => Ok(ContainerType::None),
            other => Err(ReconcileError::ConfigError(format!(
                "unknown container type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    #[serde(rename = "type")]
    pub kind: ContainerType,

    /// Docker image, `None` when no docker settings are given
    pub image: Option<String>,

    /// Upper-cased docker network mode
    pub network: Option<String>,

    pub port_mappings: Vec<PortMapping>,

    pub volumes: Vec<Volume>,
}

impl ContainerSpec {
    /// Empty descriptor of type "none"
    pub fn none() -> Self {
        Self::default()
    }
}

/// Docker port mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u32,

    pub host_port: u32,

    /// Lower-cased, `tcp` unless given
    pub protocol: String,

    /// [`WILDCARD_SERVICE_PORT`] when unset
    pub service_port: u32,
}

impl PortMapping {
    pub fn new(container_port: u32, host_port: u32, protocol: &str, service_port: u32) -> Self {
        Self {
            container_port,
            host_port,
            protocol: protocol.to_lowercase(),
            service_port,
        }
    }

    /// Whether this desired mapping is satisfied by `actual`
    pub fn accepts(&self, actual: &PortMapping) -> bool {
        self.container_port == actual.container_port
            && self.host_port == actual.host_port
            && self.protocol == actual.protocol
            && (self.service_port == WILDCARD_SERVICE_PORT
                || self.service_port == actual.service_port)
    }
}

/// Container volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub container_path: String,

    pub host_path: Option<String>,

    /// Upper-cased, `RW` unless given
    pub mode: String,
}

/// Placement constraint, `[field, operator, value?]` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub field: String,
    pub operator: String,
    pub value: Option<String>,
}

impl Constraint {
    /// Parse the `[field, operator, value?]` form
    pub fn from_parts(parts: &[String]) -> Result<Self, ReconcileError> {
        match parts {
            [field, operator] => Ok(Self {
                field: field.clone(),
                operator: operator.to_uppercase(),
                value: None,
            }),
            [field, operator, value] => Ok(Self {
                field: field.clone(),
                operator: operator.to_uppercase(),
                value: Some(value.clone()),
            }),
            _ => Err(ReconcileError::ConfigError(format!(
                "constraint must have 2 or 3 elements, got {:?}",
                parts
            ))),
        }
    }

    pub fn to_parts(&self) -> Vec<String> {
        let mut parts = vec![self.field.clone(), self.operator.clone()];
        if let Some(value) = &self.value {
            parts.push(value.clone());
        }
        parts
    }
}

/// Health check in canonical form: every field Marathon defaults is filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub protocol: String,

    /// Only set for HTTP-style protocols
    pub path: Option<String>,

    pub port_index: u32,

    /// Only set for the COMMAND protocol
    pub command: Option<String>,

    pub grace_period_seconds: u32,

    pub interval_seconds: u32,

    pub timeout_seconds: u32,

    pub max_consecutive_failures: u32,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            protocol: "HTTP".to_string(),
            path: None,
            port_index: 0,
            command: None,
            grace_period_seconds: 300,
            interval_seconds: 60,
            timeout_seconds: 20,
            max_consecutive_failures: 3,
        }
    }
}

impl HealthCheck {
    /// Drop the fields the protocol does not use and default the path
    pub fn canonical(mut self) -> Self {
        self.protocol = self.protocol.to_uppercase();
        if self.protocol == "COMMAND" {
            self.path = None;
        } else {
            self.command = None;
            if self.protocol.ends_with("HTTP") || self.protocol.ends_with("HTTPS") {
                self.path.get_or_insert_with(|| "/".to_string());
            } else {
                self.path = None;
            }
        }
        self
    }
}

/// App state fetched from Marathon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAppState {
    #[serde(flatten)]
    pub app: AppSpec,

    /// Opaque token, changes on every accepted mutation
    pub version: String,

    pub tasks_running: u32,

    pub tasks_staged: u32,
}

impl RemoteAppState {
    /// Whether the deployment that replaced `previous_version` rolled out
    /// `instances` tasks. A create has no previous version.
    pub fn has_converged(&self, previous_version: Option<&str>, instances: u32) -> bool {
        previous_version != Some(self.version.as_str())
            && self.tasks_running == instances
            && self.tasks_staged == 0
    }
}
