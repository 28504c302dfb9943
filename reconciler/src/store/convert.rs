//! Conversions between wire models and canonical models
//!
//! Reads apply the same canonicalization as [`crate::normalize`] so that
//! fields Marathon fills in on its own never show up as drift.

use marathon_api::models as wire;

use crate::errors::ReconcileError;
use crate::models::{
    AppSpec, Constraint, ContainerSpec, ContainerType, HealthCheck, PortMapping, RemoteAppState,
    TaskRecord, Volume, WILDCARD_SERVICE_PORT,
};
use crate::normalize::{
    coerce_env_value, non_empty, normalize_mode, normalize_network, normalize_protocol,
};

/// Build the write model for create and update requests
pub fn to_definition(spec: &AppSpec) -> wire::AppDefinition {
    wire::AppDefinition {
        id: spec.id.clone(),
        cmd: spec.cmd.clone(),
        args: spec.args.clone(),
        cpus: spec.cpus,
        mem: spec.mem,
        instances: spec.instances,
        env: spec.env.clone(),
        container: to_wire_container(&spec.container),
        constraints: spec.constraints.iter().map(Constraint::to_parts).collect(),
        health_checks: spec.health_checks.iter().map(to_wire_health_check).collect(),
    }
}

/// Canonicalize a fetched app
pub fn from_app(app: wire::App) -> Result<RemoteAppState, ReconcileError> {
    let constraints = app
        .constraints
        .iter()
        .map(|parts| Constraint::from_parts(parts))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReconcileError::RemoteError(format!("app {}: {}", app.id, e)))?;

    let container = match app.container {
        Some(container) => from_wire_container(container)
            .map_err(|e| ReconcileError::RemoteError(format!("app {}: {}", app.id, e)))?,
        None => ContainerSpec::none(),
    };

    Ok(RemoteAppState {
        app: AppSpec {
            cmd: non_empty(app.cmd.as_deref()),
            args: app.args.filter(|args| !args.is_empty()),
            cpus: app.cpus,
            mem: app.mem,
            instances: app.instances,
            env: app
                .env
                .iter()
                .map(|(key, value)| (key.clone(), coerce_env_value(value)))
                .collect(),
            container,
            constraints,
            health_checks: app
                .health_checks
                .into_iter()
                .map(from_wire_health_check)
                .collect(),
            id: app.id,
        },
        version: app.version.unwrap_or_default(),
        tasks_running: app.tasks_running,
        tasks_staged: app.tasks_staged,
    })
}

pub fn from_task(task: wire::Task) -> TaskRecord {
    TaskRecord {
        id: task.id,
        app_id: task.app_id,
        host: task.host,
        ports: task.ports,
        started_at: task.started_at,
        staged_at: task.staged_at,
    }
}

fn to_wire_container(container: &ContainerSpec) -> Option<wire::Container> {
    if container.kind == ContainerType::None {
        return None;
    }

    let docker = container.image.as_ref().map(|image| wire::Docker {
        image: image.clone(),
        network: container.network.clone(),
        port_mappings: Some(
            container
                .port_mappings
                .iter()
                .map(|pm| wire::PortMapping {
                    container_port: pm.container_port,
                    host_port: Some(pm.host_port),
                    service_port: Some(pm.service_port),
                    protocol: Some(pm.protocol.clone()),
                })
                .collect(),
        ),
    });

    Some(wire::Container {
        kind: container.kind.as_str().to_string(),
        docker,
        volumes: container
            .volumes
            .iter()
            .map(|v| wire::Volume {
                container_path: v.container_path.clone(),
                host_path: v.host_path.clone(),
                mode: Some(v.mode.clone()),
            })
            .collect(),
    })
}

fn from_wire_container(container: wire::Container) -> Result<ContainerSpec, ReconcileError> {
    let kind: ContainerType = container.kind.parse()?;

    let (image, network, port_mappings) = match container.docker {
        Some(docker) => (
            non_empty(Some(docker.image.trim())),
            normalize_network(docker.network.as_deref()),
            docker
                .port_mappings
                .unwrap_or_default()
                .into_iter()
                .map(|pm| PortMapping {
                    container_port: pm.container_port,
                    host_port: pm.host_port.unwrap_or(0),
                    protocol: normalize_protocol(pm.protocol.as_deref()),
                    service_port: pm.service_port.unwrap_or(WILDCARD_SERVICE_PORT),
                })
                .collect(),
        ),
        None => (None, None, Vec::new()),
    };

    Ok(ContainerSpec {
        kind,
        image,
        network,
        port_mappings,
        volumes: container
            .volumes
            .into_iter()
            .map(|v| Volume {
                host_path: non_empty(v.host_path.as_deref()),
                mode: normalize_mode(v.mode.as_deref()),
                container_path: v.container_path,
            })
            .collect(),
    })
}

fn to_wire_health_check(check: &HealthCheck) -> wire::HealthCheck {
    wire::HealthCheck {
        protocol: Some(check.protocol.clone()),
        path: check.path.clone(),
        port_index: Some(check.port_index),
        command: check
            .command
            .clone()
            .map(|value| wire::CommandCheck { value }),
        grace_period_seconds: Some(check.grace_period_seconds),
        interval_seconds: Some(check.interval_seconds),
        timeout_seconds: Some(check.timeout_seconds),
        max_consecutive_failures: Some(check.max_consecutive_failures),
    }
}

fn from_wire_health_check(check: wire::HealthCheck) -> HealthCheck {
    let defaults = HealthCheck::default();
    HealthCheck {
        protocol: non_empty(check.protocol.as_deref()).unwrap_or(defaults.protocol),
        path: non_empty(check.path.as_deref()),
        port_index: check.port_index.unwrap_or(defaults.port_index),
        command: check.command.map(|c| c.value).filter(|c| !c.is_empty()),
        grace_period_seconds: check
            .grace_period_seconds
            .unwrap_or(defaults.grace_period_seconds),
        interval_seconds: check.interval_seconds.unwrap_or(defaults.interval_seconds),
        timeout_seconds: check.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        max_consecutive_failures: check
            .max_consecutive_failures
            .unwrap_or(defaults.max_consecutive_failures),
    }
    .canonical()
}
