//! Shared test doubles

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use marathon_reconciler::config::ModuleParams;
use marathon_reconciler::errors::ReconcileError;
use marathon_reconciler::models::{AppSpec, RemoteAppState, TaskRecord, WILDCARD_SERVICE_PORT};
use marathon_reconciler::normalize::normalize;
use marathon_reconciler::report::ReportSink;
use marathon_reconciler::store::{Lookup, RemoteAppStore};

/// Store call, recorded in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Create(String),
    Update(String),
    Delete(String),
    ListTasks(String),
    ListVersions(String),
}

/// What a scripted `get` answers
#[derive(Debug, Clone)]
pub enum Observation {
    Found(RemoteAppState),
    NotFound,
    Error(String),
}

#[derive(Default)]
struct Inner {
    app: Option<RemoteAppState>,
    script: VecDeque<Observation>,
    after_mutation: Option<Vec<Observation>>,
    calls: Vec<Call>,
    versions: Vec<String>,
    next_version: u32,
    stall: bool,
    fail_mutations: Option<String>,
}

impl Inner {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        let version = format!("v{}", self.next_version);
        self.versions.insert(0, version.clone());
        version
    }

    /// Accept a definition the way Marathon does: new version, staged first
    fn roll_out(&mut self, spec: &AppSpec) {
        let app = assign_service_ports(spec);
        let version = self.bump_version();

        let staged = RemoteAppState {
            app: app.clone(),
            version: version.clone(),
            tasks_running: 0,
            tasks_staged: app.instances,
        };

        if self.stall {
            self.app = Some(staged);
            return;
        }

        match self.after_mutation.take() {
            Some(observations) => self.script.extend(observations),
            None => self.script.push_back(Observation::Found(staged)),
        }

        self.app = Some(RemoteAppState {
            tasks_running: app.instances,
            tasks_staged: 0,
            app,
            version,
        });
    }
}

/// In-memory Marathon with scriptable reads
#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<Inner>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already running `spec` at version `v1`
    pub fn with_app(spec: &AppSpec) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap();
            let app = assign_service_ports(spec);
            let version = inner.bump_version();
            inner.app = Some(RemoteAppState {
                tasks_running: app.instances,
                tasks_staged: 0,
                app,
                version,
            });
        }
        store
    }

    pub fn state(&self) -> Option<RemoteAppState> {
        self.inner.lock().unwrap().app.clone()
    }

    /// Answers for the next gets, before the stored app is returned again
    pub fn script(&self, observations: Vec<Observation>) {
        self.inner.lock().unwrap().script.extend(observations);
    }

    /// Answers for the gets following the next accepted mutation
    pub fn script_after_mutation(&self, observations: Vec<Observation>) {
        self.inner.lock().unwrap().after_mutation = Some(observations);
    }

    /// Accepted mutations never leave the staged state
    pub fn stall_rollouts(&self) {
        self.inner.lock().unwrap().stall = true;
    }

    /// Reject every mutation with `message`
    pub fn fail_mutations(&self, message: &str) {
        self.inner.lock().unwrap().fail_mutations = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn gets(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count()
    }

    /// Every call except reads
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create(_) | Call::Update(_) | Call::Delete(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn check_mutation(&self) -> Result<(), ReconcileError> {
        match &self.inner.lock().unwrap().fail_mutations {
            Some(message) => Err(ReconcileError::RemoteError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteAppStore for FakeStore {
    async fn get(&self, id: &str) -> Result<Lookup<RemoteAppState>, ReconcileError> {
        self.record(Call::Get(id.to_string()));
        let mut inner = self.inner.lock().unwrap();

        if let Some(observation) = inner.script.pop_front() {
            return match observation {
                Observation::Found(state) => Ok(Lookup::Found(state)),
                Observation::NotFound => Ok(Lookup::NotFound),
                Observation::Error(message) => Err(ReconcileError::RemoteError(message)),
            };
        }

        Ok(match &inner.app {
            Some(app) if app.app.id == id => Lookup::Found(app.clone()),
            _ => Lookup::NotFound,
        })
    }

    async fn create(&self, spec: &AppSpec) -> Result<(), ReconcileError> {
        self.record(Call::Create(spec.id.clone()));
        self.check_mutation()?;

        let mut inner = self.inner.lock().unwrap();
        if inner.app.is_some() {
            return Err(ReconcileError::RemoteError(format!(
                "409 Conflict: An app with id [{}] already exists.",
                spec.id
            )));
        }
        inner.roll_out(spec);
        Ok(())
    }

    async fn update(&self, id: &str, spec: &AppSpec) -> Result<(), ReconcileError> {
        self.record(Call::Update(id.to_string()));
        self.check_mutation()?;

        self.inner.lock().unwrap().roll_out(spec);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ReconcileError> {
        self.record(Call::Delete(id.to_string()));
        self.check_mutation()?;

        let mut inner = self.inner.lock().unwrap();
        inner.app = None;
        inner.versions.clear();
        Ok(())
    }

    async fn list_tasks(&self, app_id: &str) -> Result<Vec<TaskRecord>, ReconcileError> {
        self.record(Call::ListTasks(app_id.to_string()));
        let inner = self.inner.lock().unwrap();
        let app = inner
            .app
            .as_ref()
            .ok_or_else(|| ReconcileError::NotFound(app_id.to_string()))?;

        let started = (0..app.tasks_running).map(|i| TaskRecord {
            id: format!("{}.task-{}", app_id.trim_start_matches('/'), i),
            app_id: app_id.to_string(),
            host: "agent-1".to_string(),
            ports: vec![],
            started_at: Some(Utc::now()),
            staged_at: Some(Utc::now()),
        });
        let staged = (0..app.tasks_staged).map(|i| TaskRecord {
            id: format!("{}.staged-{}", app_id.trim_start_matches('/'), i),
            app_id: app_id.to_string(),
            host: "agent-1".to_string(),
            ports: vec![],
            started_at: None,
            staged_at: Some(Utc::now()),
        });
        Ok(started.chain(staged).collect())
    }

    async fn list_versions(&self, app_id: &str) -> Result<Vec<String>, ReconcileError> {
        self.record(Call::ListVersions(app_id.to_string()));
        let inner = self.inner.lock().unwrap();
        if inner.app.is_none() {
            return Err(ReconcileError::NotFound(app_id.to_string()));
        }
        Ok(inner.versions.clone())
    }
}

/// Marathon fills wildcard service ports with concrete ones
fn assign_service_ports(spec: &AppSpec) -> AppSpec {
    let mut app = spec.clone();
    for (i, mapping) in app.container.port_mappings.iter_mut().enumerate() {
        if mapping.service_port == WILDCARD_SERVICE_PORT {
            mapping.service_port = 10000 + i as u32;
        }
    }
    app
}

/// Report, as received by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Succeeded {
        changed: bool,
        final_state: Option<RemoteAppState>,
    },
    Failed(String),
}

/// Sink keeping every report
#[derive(Default)]
pub struct RecordingSink {
    pub reports: Vec<Report>,
}

impl ReportSink for RecordingSink {
    fn succeed(
        &mut self,
        changed: bool,
        final_state: Option<&RemoteAppState>,
    ) -> Result<(), ReconcileError> {
        self.reports.push(Report::Succeeded {
            changed,
            final_state: final_state.cloned(),
        });
        Ok(())
    }

    fn fail(&mut self, message: &str) -> Result<(), ReconcileError> {
        self.reports.push(Report::Failed(message.to_string()));
        Ok(())
    }
}

/// Canonical spec for `params`
pub fn app(params: &ModuleParams) -> AppSpec {
    normalize(params).unwrap()
}

/// Remote state of `spec` with explicit counters
pub fn observed(spec: &AppSpec, version: &str, running: u32, staged: u32) -> RemoteAppState {
    RemoteAppState {
        app: assign_service_ports(spec),
        version: version.to_string(),
        tasks_running: running,
        tasks_staged: staged,
    }
}
