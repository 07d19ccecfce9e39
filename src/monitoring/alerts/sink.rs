//! Alert sink
//!
//! Recording an alert has two phases. The alert is persisted first and that
//! result is what callers see. Forwarding to notification channels then runs
//! in a spawned task with a per-channel timeout; its failures are logged and
//! counted but never reach the caller or touch the stored alert.

use super::channels::NotificationChannel;
use crate::core::models::{Alert, NewAlert};
use crate::storage::MonitorStore;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters kept by the sink
#[derive(Debug, Clone, Default, Serialize)]
pub struct SinkStats {
    /// Alerts persisted
    pub recorded: u64,
    /// Alerts by severity name
    pub by_severity: HashMap<String, u64>,
    /// Successful channel deliveries
    pub delivered: u64,
    /// Failed or timed out channel deliveries
    pub failed_deliveries: u64,
    /// Timestamp of the latest recorded alert
    pub last_alert: Option<DateTime<Utc>>,
}

/// Persists alerts and forwards them to notification channels
#[derive(Debug)]
pub struct AlertSink {
    store: Arc<dyn MonitorStore>,
    channels: Arc<Vec<Arc<dyn NotificationChannel>>>,
    channel_timeout: Duration,
    stats: Arc<RwLock<SinkStats>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl AlertSink {
    pub fn new(
        store: Arc<dyn MonitorStore>,
        channels: Vec<Arc<dyn NotificationChannel>>,
        channel_timeout: Duration,
    ) -> Self {
        Self {
            store,
            channels: Arc::new(channels),
            channel_timeout,
            stats: Arc::new(RwLock::new(SinkStats::default())),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Persist an alert, then forward it in the background
    pub async fn record(&self, alert: NewAlert) -> Result<Alert> {
        let alert = self.store.insert_alert(alert).await?;
        info!(
            alert_id = alert.id,
            severity = %alert.severity,
            title = %alert.title,
            "alert recorded"
        );

        {
            let mut stats = self.stats.write();
            stats.recorded += 1;
            *stats
                .by_severity
                .entry(alert.severity.as_str().to_string())
                .or_insert(0) += 1;
            stats.last_alert = Some(alert.timestamp);
        }

        self.forward(&alert);
        Ok(alert)
    }

    /// Acknowledge a stored alert
    ///
    /// Re-acknowledging is accepted and keeps the first acknowledger.
    pub async fn acknowledge(&self, alert_id: i64, user: &str, now: DateTime<Utc>) -> Result<Alert> {
        let user = user.trim();
        if user.is_empty() {
            return Err(MonitorError::validation("user cannot be empty"));
        }

        let mut alert = self
            .store
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| MonitorError::not_found(format!("Alert {} not found", alert_id)))?;

        if alert.acknowledge(user, now) {
            self.store.update_alert(&alert).await?;
            info!(alert_id, user, "alert acknowledged");
        } else {
            debug!(alert_id, "alert already acknowledged");
        }
        Ok(alert)
    }

    pub fn stats(&self) -> SinkStats {
        self.stats.read().clone()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Wait for every in-flight forwarding task
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Alert forwarding task failed: {}", e);
            }
        }
    }

    fn forward(&self, alert: &Alert) {
        let targets: Vec<Arc<dyn NotificationChannel>> = self
            .channels
            .iter()
            .filter(|channel| channel.supports_severity(alert.severity))
            .cloned()
            .collect();
        if targets.is_empty() {
            return;
        }

        let text = alert.notification_text();
        let alert_id = alert.id;
        let timeout = self.channel_timeout;
        let stats = self.stats.clone();

        let handle = tokio::spawn(async move {
            let deliveries = targets.iter().map(|channel| {
                let text = text.as_str();
                async move {
                    let outcome = tokio::time::timeout(timeout, channel.notify(text)).await;
                    (channel.name().to_string(), outcome)
                }
            });

            for (channel, outcome) in futures::future::join_all(deliveries).await {
                match outcome {
                    Ok(Ok(())) => {
                        debug!(alert_id, channel = %channel, "alert delivered");
                        stats.write().delivered += 1;
                    }
                    Ok(Err(e)) => {
                        warn!(alert_id, channel = %channel, "Alert delivery failed: {}", e);
                        stats.write().failed_deliveries += 1;
                    }
                    Err(_) => {
                        warn!(alert_id, channel = %channel, "Alert delivery timed out after {:?}", timeout);
                        stats.write().failed_deliveries += 1;
                    }
                }
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
