//! Error types for the prediction relay.

use thiserror::Error;

/// Errors that fail a prediction request.
///
/// Upstream failures never show up here: the orchestrator swallows them
/// and substitutes defaults so the caller always gets an envelope.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PredictError::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PredictError::Internal(msg.into())
    }

    /// HTTP status code this error maps to.
    pub fn code(&self) -> u16 {
        match self {
            PredictError::InvalidInput(_) => 400,
            PredictError::Internal(_) => 500,
        }
    }

    /// Message safe to show to clients. Internal detail stays in the logs.
    pub fn public_detail(&self) -> String {
        match self {
            PredictError::InvalidInput(msg) => msg.clone(),
            PredictError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Failures talking to one of the external services.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("{0} is not configured (missing credentials)")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} from {service}")]
    Status { service: &'static str, status: u16 },

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upstream returned empty response")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(String),
}
