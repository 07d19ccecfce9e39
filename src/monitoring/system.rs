//! Core MonitoringSystem implementation

use crate::config::MonitorConfig;
use crate::core::models::{MonitoredService, ServiceName};
use crate::storage::{self, MonitorStore};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::alerts::{AlertSink, NotificationChannel, build_channels};
use super::escalation::EscalationEngine;
use super::health::{HealthProbe, HealthScheduler, HttpProbe};
use super::locks::{EntityKey, EntityLocks};
use super::pipeline::PipelineMonitor;
use super::retention::RetentionSweeper;

/// Main monitoring system
///
/// Owns the evaluators and the state they share. Cloning is cheap.
#[derive(Clone)]
pub struct MonitoringSystem {
    pub(super) config: Arc<MonitorConfig>,
    pub(super) store: Arc<dyn MonitorStore>,
    pub(super) locks: Arc<EntityLocks>,
    pub(super) escalation: Arc<EscalationEngine>,
    pub(super) sink: Arc<AlertSink>,
    pub(super) health: Arc<HealthScheduler>,
    pub(super) pipelines: Arc<PipelineMonitor>,
    pub(super) retention: Arc<RetentionSweeper>,
    pub(super) start_time: Instant,
}

impl MonitoringSystem {
    /// Wire the evaluators over an existing store, probe and channel set
    pub fn new(
        config: MonitorConfig,
        store: Arc<dyn MonitorStore>,
        probe: Arc<dyn HealthProbe>,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        let config = Arc::new(config);
        let locks = Arc::new(EntityLocks::new());
        let escalation = Arc::new(EscalationEngine::new(config.escalation.clone()));
        let sink = Arc::new(AlertSink::new(
            store.clone(),
            channels,
            config.alerting.channel_timeout(),
        ));

        let health = Arc::new(HealthScheduler::new(
            config.health.clone(),
            store.clone(),
            probe,
            locks.clone(),
            escalation.clone(),
            sink.clone(),
        ));
        let pipelines = Arc::new(PipelineMonitor::new(
            config.pipelines.clone(),
            store.clone(),
            locks.clone(),
            sink.clone(),
        ));
        let retention = Arc::new(RetentionSweeper::new(
            config.retention.clone(),
            store.clone(),
        ));

        Self {
            config,
            store,
            locks,
            escalation,
            sink,
            health,
            pipelines,
            retention,
            start_time: Instant::now(),
        }
    }

    /// Build the full system from configuration
    pub async fn from_config(config: MonitorConfig) -> Result<Self> {
        info!("Initializing monitoring system");

        let store = storage::open_store(&config.storage).await?;
        let probe = Arc::new(HttpProbe::new(config.health.probe_timeout())?);
        let channels = build_channels(&config.alerting)?;
        if channels.is_empty() {
            warn!("No notification channels configured, alerts are only recorded");
        }

        let system = Self::new(config, store, probe, channels);
        info!("Monitoring system initialized successfully");
        Ok(system)
    }

    /// Register every service listed in configuration
    pub async fn register_configured_services(&self, now: DateTime<Utc>) -> Result<usize> {
        for entry in &self.config.services {
            self.health
                .register(entry.name, entry.endpoint.clone(), now)
                .await?;
        }
        info!(
            count = self.config.services.len(),
            "registered configured services"
        );
        Ok(self.config.services.len())
    }

    /// Remove a service with its metric samples and escalation state
    pub async fn remove_service(&self, name: ServiceName) -> Result<bool> {
        let key = EntityKey::Service(name);
        let removed = {
            let _guard = self.locks.lock(key).await;
            let removed = self.store.delete_service(name).await?;
            self.escalation.clear(key);
            removed
        };
        self.locks.forget(key);
        if removed {
            info!(service = %name, "service removed");
        }
        Ok(removed)
    }

    pub async fn services(&self) -> Result<Vec<MonitoredService>> {
        self.store.list_services().await
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn MonitorStore> {
        &self.store
    }

    pub fn health(&self) -> &HealthScheduler {
        &self.health
    }

    pub fn pipelines(&self) -> &PipelineMonitor {
        &self.pipelines
    }

    pub fn retention(&self) -> &RetentionSweeper {
        &self.retention
    }

    pub fn alerts(&self) -> &AlertSink {
        &self.sink
    }

    pub fn escalation(&self) -> &EscalationEngine {
        &self.escalation
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
