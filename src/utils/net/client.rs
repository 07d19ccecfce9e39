use crate::utils::error::{MonitorError, Result};
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("fleet-monitor/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

/// Bounded retry policy with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Status codes treated as transient
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

pub struct ClientUtils;

impl ClientUtils {
    pub fn create_http_client(config: &HttpClientConfig) -> Result<Client> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.default_headers {
            headers.insert(
                reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    MonitorError::config(format!("Invalid header name '{}': {}", key, e))
                })?,
                reqwest::header::HeaderValue::from_str(value).map_err(|e| {
                    MonitorError::config(format!("Invalid header value for '{}': {}", key, e))
                })?,
            );
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(client)
    }

    /// Whether a response status is worth another attempt
    ///
    /// `attempt` is 1-based: the attempt that just produced `status_code`.
    pub fn should_retry_request(config: &RetryConfig, status_code: u16, attempt: u32) -> bool {
        attempt < config.max_attempts && config.retry_statuses.contains(&status_code)
    }

    /// Delay before the attempt following `attempt` (1-based)
    ///
    /// `initial_delay * multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn calculate_retry_delay(config: &RetryConfig, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let base_delay = config.initial_delay.as_millis() as f64;
        let delay_ms = base_delay * config.backoff_multiplier.powi(exponent);
        let capped_delay = delay_ms.min(config.max_delay.as_millis() as f64);
        Duration::from_millis(capped_delay as u64)
    }

    pub fn add_path_to_base(base: &str, path: &str) -> String {
        let base = base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
