//! Telemetry client configuration

use super::errors::{ClientError, Result};
use crate::core::models::ServiceName;
use crate::utils::is_valid_url;
use crate::utils::net::RetryConfig;
use std::time::Duration;

/// Settings of a [`TelemetryClient`](super::TelemetryClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the monitor's HTTP surface
    pub base_url: String,
    /// Service this client reports for
    pub service: ServiceName,
    /// Sent as a bearer token when set
    pub api_key: Option<String>,
    pub retry: RetryConfig,
    /// Per-request timeout
    pub timeout: Duration,
    /// Period of the continuous collection loop
    pub interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, service: ServiceName) -> Self {
        Self {
            base_url: base_url.into(),
            service,
            api_key: None,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(10),
            interval: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_url(&self.base_url) {
            return Err(ClientError::Config(format!(
                "Invalid base URL: {}",
                self.base_url
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::Config(
                "Retry policy needs at least one attempt".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Config("Timeout must be positive".to_string()));
        }
        if self.interval.is_zero() {
            return Err(ClientError::Config(
                "Collection interval must be positive".to_string(),
            ));
        }
        if matches!(&self.api_key, Some(key) if key.trim().is_empty()) {
            return Err(ClientError::Config("API key is empty".to_string()));
        }
        Ok(())
    }
}
