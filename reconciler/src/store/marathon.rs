//! Marathon REST client

use std::time::Duration;

use async_trait::async_trait;
use marathon_api::models::{
    AppResponse, DeploymentRef, ErrorResponse, TasksResponse, VersionsResponse,
};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::errors::ReconcileError;
use crate::models::{AppSpec, RemoteAppState, TaskRecord};
use crate::store::convert::{from_app, from_task, to_definition};
use crate::store::{Lookup, RemoteAppStore};
use crate::utils::user_agent;

/// HTTP client for the Marathon v2 API
pub struct MarathonClient {
    client: Client,
    base_url: Url,
}

impl MarathonClient {
    /// Create a new client for the Marathon at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReconcileError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ReconcileError::ConfigError(format!(
                "invalid Marathon URL: {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `/v2/apps/{id}/{suffix...}`, each id segment escaped
    fn apps_url(&self, id: &str, suffix: &[&str]) -> Result<Url, ReconcileError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ReconcileError::ConfigError(format!("invalid Marathon URL: {}", self.base_url))
            })?;
            segments.pop_if_empty().extend(["v2", "apps"]);
            segments.extend(id.split('/').filter(|s| !s.is_empty()));
            segments.extend(suffix);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Lookup<T>, ReconcileError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("GET {} returned 404", url);
            return Ok(Lookup::NotFound);
        }

        let response = check_status("GET", response).await?;
        Ok(Lookup::Found(response.json().await?))
    }
}

/// Turn a non-2xx response into a `RemoteError` carrying status and body
async fn check_status(method: &str, response: Response) -> Result<Response, ReconcileError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    match rejection_message(&body) {
        Some(message) => error!("HTTP {} {} failed: {} - {}", method, url, status, message),
        None => error!("HTTP {} {} failed: {} - {}", method, url, status, body),
    }
    Err(ReconcileError::RemoteError(format!("{}: {}", status, body)))
}

/// Marathon's `{"message": ...}` explanation, when the body carries one
fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
}

#[async_trait]
impl RemoteAppStore for MarathonClient {
    async fn get(&self, id: &str) -> Result<Lookup<RemoteAppState>, ReconcileError> {
        let url = self.apps_url(id, &[])?;
        match self.get_json::<AppResponse>(url).await? {
            Lookup::Found(body) => Ok(Lookup::Found(from_app(body.app)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn create(&self, spec: &AppSpec) -> Result<(), ReconcileError> {
        let url = self.apps_url("", &[])?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&to_definition(spec))
            .send()
            .await?;
        check_status("POST", response).await?;
        Ok(())
    }

    async fn update(&self, id: &str, spec: &AppSpec) -> Result<(), ReconcileError> {
        let url = self.apps_url(id, &[])?;
        debug!("PUT {}", url);

        let response = self
            .client
            .put(url)
            .json(&to_definition(spec))
            .send()
            .await?;
        let response = check_status("PUT", response).await?;

        if let Ok(deployment) = response.json::<DeploymentRef>().await {
            debug!(
                "Deployment {} started for {} (version {})",
                deployment.deployment_id, id, deployment.version
            );
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ReconcileError> {
        let url = self.apps_url(id, &[])?;
        debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        check_status("DELETE", response).await?;
        Ok(())
    }

    async fn list_tasks(&self, app_id: &str) -> Result<Vec<TaskRecord>, ReconcileError> {
        let url = self.apps_url(app_id, &["tasks"])?;
        match self.get_json::<TasksResponse>(url).await? {
            Lookup::Found(body) => Ok(body.tasks.into_iter().map(from_task).collect()),
            Lookup::NotFound => Err(ReconcileError::NotFound(app_id.to_string())),
        }
    }

    async fn list_versions(&self, app_id: &str) -> Result<Vec<String>, ReconcileError> {
        let url = self.apps_url(app_id, &["versions"])?;
        match self.get_json::<VersionsResponse>(url).await? {
            Lookup::Found(body) => Ok(body.versions),
            Lookup::NotFound => Err(ReconcileError::NotFound(app_id.to_string())),
        }
    }
}
