//! Desired-vs-actual comparison
//!
//! Both sides are canonical (see [`crate::normalize`] and
//! [`crate::store::convert`]), so most predicates are plain inequality. The
//! exceptions are the argument vector, which only counts when one is
//! requested, and port mappings, which treat a zero service port as a
//! wildcard because Marathon assigns one when it is left out.

use std::fmt;

use crate::models::{AppSpec, ContainerSpec, PortMapping, RemoteAppState, WILDCARD_SERVICE_PORT};

/// First field found to differ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    Args,
    Command,
    Cpus,
    Memory,
    Instances,
    Env,
    ContainerType,
    Docker,
    Volumes,
    Constraints,
    HealthChecks,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self {
            Drift::Args => "args",
            Drift::Command => "cmd",
            Drift::Cpus => "cpus",
            Drift::Memory => "mem",
            Drift::Instances => "instances",
            Drift::Env => "env",
            Drift::ContainerType => "container.type",
            Drift::Docker => "container.docker",
            Drift::Volumes => "container.volumes",
            Drift::Constraints => "constraints",
            Drift::HealthChecks => "healthChecks",
        };
        f.write_str(field)
    }
}

/// Compare a declaration with the live app, stopping at the first difference
pub fn diff(desired: &AppSpec, actual: &RemoteAppState) -> Option<Drift> {
    let actual = &actual.app;

    if args_changed(desired, actual) {
        return Some(Drift::Args);
    }
    if desired.cmd != actual.cmd {
        return Some(Drift::Command);
    }
    if desired.cpus != actual.cpus {
        return Some(Drift::Cpus);
    }
    if desired.mem != actual.mem {
        return Some(Drift::Memory);
    }
    if desired.instances != actual.instances {
        return Some(Drift::Instances);
    }
    if desired.env != actual.env {
        return Some(Drift::Env);
    }
    if desired.container.kind != actual.container.kind {
        return Some(Drift::ContainerType);
    }
    if docker_changed(&desired.container, &actual.container) {
        return Some(Drift::Docker);
    }
    if desired.container.volumes != actual.container.volumes {
        return Some(Drift::Volumes);
    }
    if desired.constraints != actual.constraints {
        return Some(Drift::Constraints);
    }
    if desired.health_checks != actual.health_checks {
        return Some(Drift::HealthChecks);
    }

    None
}

/// Whether the live app has to be updated
pub fn needs_update(desired: &AppSpec, actual: &RemoteAppState) -> bool {
    diff(desired, actual).is_some()
}

fn args_changed(desired: &AppSpec, actual: &AppSpec) -> bool {
    match &desired.args {
        Some(args) if !args.is_empty() => actual.args.as_ref() != Some(args),
        _ => false,
    }
}

fn docker_changed(desired: &ContainerSpec, actual: &ContainerSpec) -> bool {
    desired.image != actual.image
        || desired.network != actual.network
        || !port_mappings_match(&desired.port_mappings, &actual.port_mappings)
}

/// Whether every desired mapping is satisfied by a distinct actual mapping.
///
/// Order does not matter. Each actual mapping satisfies at most one desired
/// mapping, so duplicates have to be matched by duplicates. Mappings with a
/// concrete service port claim their actual mapping before wildcards do.
pub fn port_mappings_match(desired: &[PortMapping], actual: &[PortMapping]) -> bool {
    let mut used = vec![false; actual.len()];

    let (wildcards, fixed): (Vec<&PortMapping>, Vec<&PortMapping>) = desired
        .iter()
        .partition(|pm| pm.service_port == WILDCARD_SERVICE_PORT);

    fixed
        .into_iter()
        .chain(wildcards)
        .all(|wanted| claim(wanted, actual, &mut used))
}

fn claim(wanted: &PortMapping, actual: &[PortMapping], used: &mut [bool]) -> bool {
    let hit = (0..actual.len()).find(|&i| !used[i] && wanted.accepts(&actual[i]));

    match hit {
        Some(i) => {
            used[i] = true;
            true
        }
        None => false,
    }
}
