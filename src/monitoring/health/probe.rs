//! Health endpoint probes

use crate::utils::error::Result;
use crate::utils::net::{ClientUtils, HttpClientConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Result of a single probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub success: bool,
    pub latency: Duration,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn healthy(latency: Duration) -> Self {
        Self {
            success: true,
            latency,
            status_code: Some(200),
            error: None,
        }
    }

    pub fn unhealthy(latency: Duration, status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            latency,
            status_code,
            error: Some(error.into()),
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self::unhealthy(after, None, format!("probe timed out after {:?}", after))
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Pulls status from a service's health endpoint
///
/// A probe never fails; an unreachable endpoint is an unhealthy outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, endpoint: &str) -> ProbeOutcome;
}

/// HTTP GET probe; only a 200 response is healthy
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientUtils::create_http_client(&HttpClientConfig {
            timeout,
            connect_timeout: timeout,
            ..Default::default()
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        let start = Instant::now();
        match self.client.get(endpoint).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                ProbeOutcome::healthy(start.elapsed())
            }
            Ok(response) => {
                let status = response.status();
                ProbeOutcome::unhealthy(
                    start.elapsed(),
                    Some(status.as_u16()),
                    format!("unexpected status {}", status),
                )
            }
            Err(e) => ProbeOutcome::unhealthy(start.elapsed(), None, e.to_string()),
        }
    }
}
