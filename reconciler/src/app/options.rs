//! Application configuration options

use std::time::Duration;

use crate::config::params::ModuleParams;
use crate::logs::LogOptions;
use crate::reconcile::waiter;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Marathon base URL
    pub marathon_url: String,

    /// Timeout of a single Marathon request
    pub request_timeout: Duration,

    /// Deployment waiter options
    pub waiter: waiter::Options,

    /// Logging options
    pub log: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            marathon_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            waiter: waiter::Options::default(),
            log: LogOptions::default(),
        }
    }
}

impl AppOptions {
    /// Runtime options carried by the module parameters
    pub fn from_params(params: &ModuleParams) -> Self {
        Self {
            marathon_url: params.host.clone(),
            request_timeout: Duration::from_secs(params.request_timeout),
            waiter: waiter::Options {
                enabled: params.wait,
                interval: Duration::from_secs(params.poll_interval.max(1)),
                timeout: Duration::from_secs(params.wait_timeout),
            },
            log: LogOptions {
                log_level: params.log_level,
                ..Default::default()
            },
        }
    }
}
