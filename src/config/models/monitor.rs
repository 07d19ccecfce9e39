//! Main monitor configuration

#![allow(missing_docs)]

use super::*;
use crate::core::models::ServiceName;
use crate::utils::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Main monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonitorConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Health check scheduler
    #[serde(default)]
    pub health: HealthConfig,
    /// Escalation tiers and transition severities
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Pipeline monitor
    #[serde(default)]
    pub pipelines: PipelineMonitorConfig,
    /// Metric retention
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Notification channels
    #[serde(default)]
    pub alerting: AlertingConfig,
    /// Services registered at startup
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

/// A service registered from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: ServiceName,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl MonitorConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay values from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("MONITOR_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("MONITOR_PORT")? {
            self.server.port = port;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            self.storage.database.url = url;
            self.storage.database.enabled = true;
        }
        if let Some(secs) = env_parse("HEALTH_CHECK_INTERVAL_SECS")? {
            self.health.check_interval_secs = secs;
        }
        if let Some(secs) = env_parse("PROBE_TIMEOUT_SECS")? {
            self.health.probe_timeout_secs = secs;
        }
        if let Some(secs) = env_parse("FRESHNESS_WINDOW_SECS")? {
            self.health.freshness_window_secs = secs;
        }
        if let Some(secs) = env_parse("PIPELINE_SWEEP_INTERVAL_SECS")? {
            self.pipelines.sweep_interval_secs = secs;
        }
        if let Some(secs) = env_parse("PIPELINE_STUCK_THRESHOLD_SECS")? {
            self.pipelines.stuck_threshold_secs = secs;
        }
        if let Some(days) = env_parse("METRIC_RETENTION_DAYS")? {
            self.retention.max_age_days = days;
        }
        if let (Ok(token), Ok(chat_id)) = (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            self.alerting.telegram = Some(TelegramConfig::new(token, chat_id));
        }
        if let Ok(webhook_url) = env::var("SLACK_WEBHOOK_URL") {
            self.alerting.slack = Some(SlackConfig::new(webhook_url));
        }
        Ok(())
    }

    /// Merge two configurations, with other taking precedence
    pub fn merge(mut self, other: Self) -> Self {
        self.server = self.server.merge(other.server);
        self.storage = self.storage.merge(other.storage);
        self.health = self.health.merge(other.health);
        self.escalation = self.escalation.merge(other.escalation);
        self.pipelines = self.pipelines.merge(other.pipelines);
        self.retention = self.retention.merge(other.retention);
        self.alerting = self.alerting.merge(other.alerting);

        // Other takes precedence for the same service name
        let mut services: HashMap<ServiceName, ServiceEntry> = self
            .services
            .into_iter()
            .map(|s| (s.name, s))
            .collect();
        for service in other.services {
            services.insert(service.name, service);
        }
        let mut services: Vec<ServiceEntry> = services.into_values().collect();
        services.sort_by_key(|s| s.name);
        self.services = services;

        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MonitorError::config(format!("Invalid value for {}: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
