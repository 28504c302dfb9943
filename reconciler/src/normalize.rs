//! Declaration normalization
//!
//! Turns [`ModuleParams`] into a canonical [`AppSpec`]. Unset and empty
//! values collapse to the same representation Marathon echoes back, so a
//! declaration that matches the live app compares equal field by field.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::params::{ModuleParams, RawContainer, RawHealthCheck, RawPortMapping, RawVolume};
use crate::errors::ReconcileError;
use crate::models::{
    AppSpec, Constraint, ContainerSpec, ContainerType, HealthCheck, PortMapping, Volume,
    WILDCARD_SERVICE_PORT,
};

/// Normalize a declaration. Pure, fails only on invalid input.
pub fn normalize(params: &ModuleParams) -> Result<AppSpec, ReconcileError> {
    let id = normalize_id(&params.name)?;

    let cmd = non_empty(params.command.as_deref());
    let args = params.args.clone().filter(|args| !args.is_empty());
    if cmd.is_some() && args.is_some() {
        return Err(ReconcileError::ConfigError(
            "command and args are mutually exclusive".to_string(),
        ));
    }

    if params.cpus.is_nan() || params.cpus <= 0.0 {
        return Err(ReconcileError::ConfigError(format!(
            "cpus must be greater than 0, got {}",
            params.cpus
        )));
    }
    if params.memory.is_nan() || params.memory <= 0.0 {
        return Err(ReconcileError::ConfigError(format!(
            "memory must be greater than 0, got {}",
            params.memory
        )));
    }

    let constraints = params
        .constraints
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|parts| Constraint::from_parts(parts))
        .collect::<Result<Vec<_>, _>>()?;

    let health_checks = params
        .health_checks
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(normalize_health_check)
        .collect();

    Ok(AppSpec {
        id,
        cmd,
        args,
        cpus: params.cpus,
        mem: params.memory,
        instances: params.instances,
        env: normalize_env(&params.env),
        container: normalize_container(params.container.as_ref())?,
        constraints,
        health_checks,
    })
}

/// Prefix the identifier with `/` when missing
pub fn normalize_id(name: &str) -> Result<String, ReconcileError> {
    let name = name.trim();
    if name.trim_start_matches('/').is_empty() {
        return Err(ReconcileError::ConfigError(
            "app name must not be empty".to_string(),
        ));
    }

    if name.starts_with('/') {
        Ok(name.to_string())
    } else {
        Ok(format!("/{}", name))
    }
}

/// Coerce every value to the string Marathon would store
pub fn normalize_env(env: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    env.iter()
        .map(|(key, value)| (key.clone(), coerce_env_value(value)))
        .collect()
}

/// String form of an environment value
pub fn coerce_env_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // numbers, booleans and nested values keep their JSON text
        other => other.to_string(),
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

pub(crate) fn normalize_network(network: Option<&str>) -> Option<String> {
    non_empty(network.map(str::trim)).map(|n| n.to_uppercase())
}

pub(crate) fn normalize_protocol(protocol: Option<&str>) -> String {
    non_empty(protocol.map(str::trim))
        .map(|p| p.to_lowercase())
        .unwrap_or_else(|| "tcp".to_string())
}

pub(crate) fn normalize_mode(mode: Option<&str>) -> String {
    non_empty(mode.map(str::trim))
        .map(|m| m.to_uppercase())
        .unwrap_or_else(|| "RW".to_string())
}

fn normalize_container(raw: Option<&RawContainer>) -> Result<ContainerSpec, ReconcileError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(ContainerSpec::none()),
    };

    let kind = match raw.kind.as_deref() {
        Some(kind) => kind.parse()?,
        None => ContainerType::Docker,
    };

    let (image, network, port_mappings) = match &raw.docker {
        Some(docker) => (
            non_empty(docker.image.as_deref().map(str::trim)),
            normalize_network(docker.network.as_deref()),
            docker.port_mappings.iter().map(normalize_port_mapping).collect(),
        ),
        None => (None, None, Vec::new()),
    };

    if kind == ContainerType::Docker && image.is_none() {
        return Err(ReconcileError::ConfigError(
            "a DOCKER container needs docker.image".to_string(),
        ));
    }

    Ok(ContainerSpec {
        kind,
        image,
        network,
        port_mappings,
        volumes: raw.volumes.iter().map(normalize_volume).collect(),
    })
}

fn normalize_port_mapping(raw: &RawPortMapping) -> PortMapping {
    PortMapping {
        container_port: raw.container_port,
        host_port: raw.host_port.unwrap_or(0),
        protocol: normalize_protocol(raw.protocol.as_deref()),
        service_port: raw.service_port.unwrap_or(WILDCARD_SERVICE_PORT),
    }
}

fn normalize_volume(raw: &RawVolume) -> Volume {
    Volume {
        container_path: raw.container_path.clone(),
        host_path: non_empty(raw.host_path.as_deref()),
        mode: normalize_mode(raw.mode.as_deref()),
    }
}

fn normalize_health_check(raw: &RawHealthCheck) -> HealthCheck {
    let defaults = HealthCheck::default();
    let command = non_empty(raw.command.as_deref());
    let protocol = match (non_empty(raw.protocol.as_deref()), &command) {
        (Some(protocol), _) => protocol,
        (None, Some(_)) => "COMMAND".to_string(),
        (None, None) => defaults.protocol,
    };

    HealthCheck {
        protocol,
        path: non_empty(raw.path.as_deref()),
        port_index: raw.port_index.unwrap_or(defaults.port_index),
        command,
        grace_period_seconds: raw
            .grace_period_seconds
            .unwrap_or(defaults.grace_period_seconds),
        interval_seconds: raw.interval_seconds.unwrap_or(defaults.interval_seconds),
        timeout_seconds: raw.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        max_consecutive_failures: raw
            .max_consecutive_failures
            .unwrap_or(defaults.max_consecutive_failures),
    }
    .canonical()
}
