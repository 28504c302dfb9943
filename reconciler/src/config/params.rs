//! Module parameters
//!
//! The raw declaration handed over by the caller, as a JSON document. Keys
//! follow the module's snake_case names; Marathon's camelCase spellings are
//! accepted as aliases inside nested objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;
use crate::models::Presence;

/// Module parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleParams {
    /// App identifier, `/` is prepended when missing
    #[serde(alias = "id")]
    pub name: String,

    /// Shell command, exclusive with `args`
    #[serde(default, alias = "cmd")]
    pub command: Option<String>,

    /// Argument vector, exclusive with `command`
    #[serde(default)]
    pub args: Option<Vec<String>>,

    #[serde(default = "default_cpus")]
    pub cpus: f64,

    #[serde(default = "default_memory", alias = "mem")]
    pub memory: f64,

    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Values of any JSON type, coerced to strings
    #[serde(default)]
    pub env: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub container: Option<RawContainer>,

    /// `[field, operator, value?]` triples
    #[serde(default)]
    pub constraints: Option<Vec<Vec<String>>>,

    #[serde(default, alias = "healthChecks")]
    pub health_checks: Option<Vec<RawHealthCheck>>,

    #[serde(default)]
    pub state: Presence,

    /// Wait for the deployment to converge after a change
    #[serde(default = "default_true")]
    pub wait: bool,

    /// Seconds to wait for convergence
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,

    /// Marathon base URL
    #[serde(default = "default_host")]
    pub host: String,

    /// Seconds between convergence polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Seconds before a single Marathon request is abandoned
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_true() -> bool {
    true
}

fn default_cpus() -> f64 {
    1.0
}

fn default_memory() -> f64 {
    256.0
}

fn default_instances() -> u32 {
    1
}

fn default_wait_timeout() -> u64 {
    300
}

fn default_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

impl ModuleParams {
    /// Parameters for `name` with every other key at its default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: None,
            args: None,
            cpus: default_cpus(),
            memory: default_memory(),
            instances: default_instances(),
            env: BTreeMap::new(),
            container: None,
            constraints: None,
            health_checks: None,
            state: Presence::default(),
            wait: true,
            wait_timeout: default_wait_timeout(),
            host: default_host(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            log_level: LogLevel::default(),
        }
    }
}

/// Container as declared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContainer {
    /// `DOCKER` when omitted but other container settings are present
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub docker: Option<RawDocker>,

    #[serde(default)]
    pub volumes: Vec<RawVolume>,
}

impl RawContainer {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.docker.is_none() && self.volumes.is_empty()
    }
}

/// Docker settings as declared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocker {
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub network: Option<String>,

    #[serde(default, alias = "portMappings")]
    pub port_mappings: Vec<RawPortMapping>,
}

/// Port mapping as declared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPortMapping {
    #[serde(alias = "containerPort")]
    pub container_port: u32,

    #[serde(default, alias = "hostPort")]
    pub host_port: Option<u32>,

    #[serde(default, alias = "servicePort")]
    pub service_port: Option<u32>,

    #[serde(default)]
    pub protocol: Option<String>,
}

/// Volume as declared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVolume {
    #[serde(alias = "containerPath")]
    pub container_path: String,

    #[serde(default, alias = "hostPath")]
    pub host_path: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,
}

/// Health check as declared
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHealthCheck {
    #[serde(default)]
    pub protocol: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default, alias = "portIndex")]
    pub port_index: Option<u32>,

    #[serde(default)]
    pub command: Option<String>,

    #[serde(default, alias = "gracePeriodSeconds")]
    pub grace_period_seconds: Option<u32>,

    #[serde(default, alias = "intervalSeconds")]
    pub interval_seconds: Option<u32>,

    #[serde(default, alias = "timeoutSeconds")]
    pub timeout_seconds: Option<u32>,

    #[serde(default, alias = "maxConsecutiveFailures")]
    pub max_consecutive_failures: Option<u32>,
}
