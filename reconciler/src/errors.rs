//! Error types for the reconciler

use thiserror::Error;

/// Main error type for the reconciler
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Invalid or contradictory input, raised before the store is contacted
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The app does not exist. Drives create-vs-update and is never reported.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure or server-side rejection, message kept verbatim
    #[error("{0}")]
    RemoteError(String),

    /// The mutation was accepted but the deployment did not converge in time
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ReconcileError {
    fn from(err: reqwest::Error) -> Self {
        ReconcileError::RemoteError(err.to_string())
    }
}

impl From<url::ParseError> for ReconcileError {
    fn from(err: url::ParseError) -> Self {
        ReconcileError::ConfigError(format!("invalid Marathon URL: {err}"))
    }
}
