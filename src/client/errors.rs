//! Error handling for the telemetry client

use thiserror::Error;

/// Telemetry client error
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The monitor answered with a non-success status
    #[error("Monitor returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;

const TRANSIENT_STATUSES: [u16; 4] = [500, 502, 503, 504];

impl ClientError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ClientError::Status { status, .. } => TRANSIENT_STATUSES.contains(status),
            ClientError::Config(_) | ClientError::Serialization(_) => false,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
