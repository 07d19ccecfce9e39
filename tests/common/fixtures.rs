//! Test fixtures
//!
//! Everything runs over the real in-memory store and the real evaluators;
//! only the probe and the notification channels are doubles.

use super::probes::{RecordingChannel, ScriptedProbe};
use chrono::{DateTime, Duration, TimeZone, Utc};
use fleet_monitor::config::{MonitorConfig, ServiceEntry};
use fleet_monitor::core::models::{Alert, AlertFilter, ServiceName};
use fleet_monitor::monitoring::{MonitoringSystem, NotificationChannel};
use fleet_monitor::storage::{MemoryStore, MonitorStore};
use std::sync::Arc;

pub const FETCHER_ENDPOINT: &str = "http://data-fetcher:8080/health";

/// Fixed start of every scripted timeline
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

/// `t0 + n hours`
pub fn hours(n: i64) -> DateTime<Utc> {
    t0() + Duration::hours(n)
}

/// A monitoring system with its doubles kept at hand
pub struct TestMonitor {
    pub system: MonitoringSystem,
    pub probe: Arc<ScriptedProbe>,
    pub channel: Arc<RecordingChannel>,
}

impl TestMonitor {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Fresh evaluators over an existing store, as after a restart
    pub fn with_store(config: MonitorConfig, store: Arc<dyn MonitorStore>) -> Self {
        let probe = Arc::new(ScriptedProbe::new());
        let channel = Arc::new(RecordingChannel::new("recorder"));
        let channels: Vec<Arc<dyn NotificationChannel>> = vec![channel.clone()];
        let system = MonitoringSystem::new(config, store, probe.clone(), channels);
        Self {
            system,
            probe,
            channel,
        }
    }

    /// Monitor with `data_fetcher` configured on [`FETCHER_ENDPOINT`]
    pub fn with_fetcher() -> Self {
        Self::with_config(fetcher_config())
    }

    /// Every stored alert, oldest first
    pub async fn alerts(&self) -> Vec<Alert> {
        let mut alerts = self
            .system
            .store()
            .query_alerts(&AlertFilter::default())
            .await
            .unwrap();
        alerts.sort_by_key(|alert| alert.id);
        alerts
    }

    pub async fn alert_titles(&self) -> Vec<String> {
        self.alerts()
            .await
            .into_iter()
            .map(|alert| alert.title)
            .collect()
    }
}

/// Default configuration listing `data_fetcher` on [`FETCHER_ENDPOINT`]
pub fn fetcher_config() -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.services.push(ServiceEntry {
        name: ServiceName::DataFetcher,
        endpoint: Some(FETCHER_ENDPOINT.to_string()),
    });
    config
}

impl Default for TestMonitor {
    fn default() -> Self {
        Self::new()
    }
}
