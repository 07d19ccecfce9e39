//! Telemetry client implementation

use super::collector::SystemCollector;
use super::config::ClientConfig;
use super::errors::{ClientError, Result};
use super::types::{AlertReport, Envelope, MetricReport, PipelineReport, StatusReport};
use crate::core::models::{Alert, MonitoredService, PipelineRun, ServiceStatus, Severity};
use crate::utils::net::{ClientUtils, HttpClientConfig, RetryConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const SERVICES_PATH: &str = "services/";
const METRICS_PATH: &str = "metrics/";
const PIPELINES_PATH: &str = "pipelines/";
const ALERTS_PATH: &str = "alerts/";

/// Title of the alert a client raises about its own failed calls
pub const CLIENT_ERROR_TITLE: &str = "Monitor Client Error";

/// Pushes status, metrics, pipeline progress and alerts to the monitor
///
/// One connection pool is shared by every call. Transient failures are
/// retried with exponential backoff; a call that still fails is reported
/// back to the monitor as an alert before the error is returned.
#[derive(Debug)]
pub struct TelemetryClient {
    config: ClientConfig,
    http: reqwest::Client,
    collector: SystemCollector,
}

impl TelemetryClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = ClientUtils::create_http_client(&HttpClientConfig {
            timeout: config.timeout,
            user_agent: format!("fleet-monitor-agent/{}", env!("CARGO_PKG_VERSION")),
            ..Default::default()
        })
        .map_err(|e| ClientError::Config(e.to_string()))?;

        info!(
            service = %config.service,
            base_url = %config.base_url,
            "telemetry client created"
        );

        Ok(Self {
            config,
            http,
            collector: SystemCollector::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Push this service's status, optionally (re)declaring its endpoint
    pub async fn update_status(
        &self,
        status: ServiceStatus,
        endpoint: Option<&str>,
    ) -> Result<MonitoredService> {
        let report = StatusReport {
            name: self.config.service,
            status,
            endpoint,
        };
        self.post(SERVICES_PATH, &report).await
    }

    /// Send local resource usage plus `custom` metrics, one event each
    ///
    /// Stops at the first metric that cannot be delivered. Returns the
    /// number of samples accepted by the monitor.
    pub async fn send_metrics(&self, custom: &[(String, f64)]) -> Result<usize> {
        let system = self.collector.collect();
        let samples = system
            .iter()
            .map(|(metric_type, value)| (*metric_type, *value))
            .chain(custom.iter().map(|(metric_type, value)| (metric_type.as_str(), *value)));

        let mut sent = 0;
        for (metric_type, value) in samples {
            let report = MetricReport {
                service: self.config.service,
                metric_type,
                value,
            };
            self.post::<_, serde_json::Value>(METRICS_PATH, &report).await?;
            sent += 1;
        }

        debug!(service = %self.config.service, sent, "metrics sent");
        Ok(sent)
    }

    /// Start or update a pipeline run
    pub async fn update_pipeline(&self, report: PipelineReport) -> Result<PipelineRun> {
        self.post(PIPELINES_PATH, &report).await
    }

    /// Raise an alert attributed to this service
    pub async fn send_alert(&self, title: &str, message: &str, severity: Severity) -> Result<Alert> {
        let report = AlertReport {
            title,
            message,
            severity,
            service: self.config.service,
        };
        self.post(ALERTS_PATH, &report).await
    }

    /// Send metrics every configured interval until `shutdown` flips
    ///
    /// A failed iteration is logged and the loop carries on; the failure
    /// has already been reported to the monitor by the failing call.
    pub async fn run_loop(&self, custom: &[(String, f64)], mut shutdown: watch::Receiver<bool>) {
        info!(
            service = %self.config.service,
            interval_secs = self.config.interval.as_secs(),
            "starting metric collection"
        );
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.send_metrics(custom).await {
                        error!(service = %self.config.service, "Metric collection failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!(service = %self.config.service, "metric collection stopped");
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        match self.post_with_retry(path, body, &self.config.retry).await {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(path, "Request failed: {}", e);
                self.report_failure(path, &e).await;
                Err(e)
            }
        }
    }

    /// Best-effort alert about a failed call; its own failure is only logged
    async fn report_failure(&self, path: &str, failure: &ClientError) {
        let message = format!("Failed to POST {}: {}", path, failure);
        let report = AlertReport {
            title: CLIENT_ERROR_TITLE,
            message: &message,
            severity: Severity::Medium,
            service: self.config.service,
        };
        if let Err(e) = self
            .post_with_retry::<_, serde_json::Value>(ALERTS_PATH, &report, &RetryConfig::no_retry())
            .await
        {
            debug!("Could not report client failure: {}", e);
        }
    }

    async fn post_with_retry<B, T>(&self, path: &str, body: &B, retry: &RetryConfig) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = ClientUtils::add_path_to_base(&self.config.base_url, path);
        let mut attempt = 1;

        loop {
            match self.post_once(&url, body).await {
                Ok(data) => return Ok(data),
                Err(e) if should_retry(retry, &e, attempt) => {
                    let delay = ClientUtils::calculate_retry_delay(retry, attempt);
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(url).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        match envelope.data {
            Some(data) if envelope.success => Ok(data),
            _ => Err(ClientError::Status {
                status: status.as_u16(),
                body: envelope
                    .error
                    .unwrap_or_else(|| "response carried no data".to_string()),
            }),
        }
    }
}

fn should_retry(retry: &RetryConfig, error: &ClientError, attempt: u32) -> bool {
    match error {
        ClientError::Status { status, .. } => {
            ClientUtils::should_retry_request(retry, *status, attempt)
        }
        other => other.is_retryable() && attempt < retry.max_attempts,
    }
}
