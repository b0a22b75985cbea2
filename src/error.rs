//! Unified dashboard error types.

use thiserror::Error;

/// Top-level dashboard error.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    /// The background connection task could not be started.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The background connection task ended abnormally.
    #[error("Connection task failed: {0}")]
    TaskFailed(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl From<serde_json::Error> for WsError {
    fn from(err: serde_json::Error) -> Self {
        WsError::DeserializationError(err.to_string())
    }
}
