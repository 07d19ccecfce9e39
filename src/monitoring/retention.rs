//! Metric retention

use crate::config::RetentionConfig;
use crate::storage::MonitorStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Deletes metric samples older than the retention age
///
/// Alerts are an audit trail and are never pruned.
#[derive(Debug)]
pub struct RetentionSweeper {
    config: RetentionConfig,
    store: Arc<dyn MonitorStore>,
}

impl RetentionSweeper {
    pub fn new(config: RetentionConfig, store: Arc<dyn MonitorStore>) -> Self {
        Self { config, store }
    }

    pub async fn sweep(&self) -> Result<u64> {
        self.sweep_at(Utc::now()).await
    }

    /// Delete samples with `timestamp < now - max_age`
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = now - self.config.max_age();
        let deleted = self.store.delete_metrics_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, cutoff = %cutoff, "pruned old metric samples");
        }
        Ok(deleted)
    }
}
