//! Storage layer for the monitor
//!
//! The evaluators and the HTTP surface only see the [`MonitorStore`] trait.
//! Two backends implement it: an in-process [`memory::MemoryStore`] and a
//! relational [`database::SeaOrmStore`].

/// Relational storage module
pub mod database;
/// In-memory storage module
pub mod memory;

use crate::config::StorageConfig;
use crate::core::models::{
    Alert, AlertFilter, MetricFilter, MetricSample, MonitoredService, NewAlert, NewMetricSample,
    NewPipelineRun, PipelineFilter, PipelineRun, ServiceName,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

pub use database::SeaOrmStore;
pub use memory::MemoryStore;

/// Persistence contract consumed by the monitor core
///
/// Query results are ordered newest first, except services which are
/// ordered by name.
#[async_trait]
pub trait MonitorStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace a service record
    async fn upsert_service(&self, service: &MonitoredService) -> Result<()>;

    async fn get_service(&self, name: ServiceName) -> Result<Option<MonitoredService>>;

    async fn list_services(&self) -> Result<Vec<MonitoredService>>;

    /// Remove a service and its metric samples
    ///
    /// Alerts are kept with their service reference cleared.
    async fn delete_service(&self, name: ServiceName) -> Result<bool>;

    async fn insert_metric(&self, sample: NewMetricSample) -> Result<MetricSample>;

    async fn query_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricSample>>;

    /// Bulk delete samples with `timestamp < cutoff`, returning the count
    async fn delete_metrics_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn insert_pipeline_run(&self, run: NewPipelineRun) -> Result<PipelineRun>;

    async fn update_pipeline_run(&self, run: &PipelineRun) -> Result<()>;

    async fn get_pipeline_run(&self, id: i64) -> Result<Option<PipelineRun>>;

    async fn query_pipeline_runs(&self, filter: &PipelineFilter) -> Result<Vec<PipelineRun>>;

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert>;

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>>;

    async fn update_alert(&self, alert: &Alert) -> Result<()>;

    async fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    /// Whether any alert matches the filter
    async fn has_alert(&self, filter: &AlertFilter) -> Result<bool> {
        Ok(!self.query_alerts(filter).await?.is_empty())
    }

    /// Verify the backend can serve requests
    async fn health_check(&self) -> Result<()>;
}

/// Open the store selected by configuration
///
/// A disabled database falls back to the in-memory store.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn MonitorStore>> {
    if config.database.enabled {
        info!("Opening relational store");
        let store = SeaOrmStore::new(&config.database).await?;
        store.migrate().await?;
        Ok(Arc::new(store))
    } else {
        info!("Database disabled, using in-memory store");
        Ok(Arc::new(MemoryStore::new()))
    }
}
