//! Logging configuration
//!
//! Stdout carries the JSON report, so every log line goes to stderr.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ReconcileError;

/// Log level configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

const LEVELS: [(&str, LogLevel); 6] = [
    ("trace", LogLevel::Trace),
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("warning", LogLevel::Warn),
    ("error", LogLevel::Error),
];

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        LEVELS
            .iter()
            .find(|(_, level)| *level == self)
            .map(|(name, _)| *name)
            .unwrap_or("info")
    }

    /// Filter directive: this crate at the chosen level, dependencies at
    /// `warn` unless the chosen level is stricter.
    pub fn directive(self) -> String {
        let deps = match self {
            LogLevel::Error => "error",
            _ => "warn",
        };
        format!("{deps},marathon_reconciler={},marathon_app={}", self, self)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        LEVELS
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, level)| *level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Log level, overridden by `RUST_LOG` when set
    pub log_level: LogLevel,

    /// Emit one JSON object per line
    pub json_format: bool,
}

/// Initialize logging
pub fn init_logging(options: &LogOptions) -> Result<(), ReconcileError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(options.log_level.directive()))
        .map_err(|e| ReconcileError::ConfigError(format!("invalid log filter: {e}")))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if options.json_format {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };

    result.map_err(|e| ReconcileError::ConfigError(e.to_string()))
}
