// Module declarations
mod alert_ops;
mod connection;
mod convert;
mod metric_ops;
mod pipeline_ops;
mod service_ops;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmStore};

use crate::core::models::{
    Alert, AlertFilter, MetricFilter, MetricSample, MonitoredService, NewAlert, NewMetricSample,
    NewPipelineRun, PipelineFilter, PipelineRun, ServiceName,
};
use crate::storage::MonitorStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl MonitorStore for SeaOrmStore {
    async fn upsert_service(&self, service: &MonitoredService) -> Result<()> {
        self.save_service(service).await
    }

    async fn get_service(&self, name: ServiceName) -> Result<Option<MonitoredService>> {
        self.find_service(name).await
    }

    async fn list_services(&self) -> Result<Vec<MonitoredService>> {
        self.all_services().await
    }

    async fn delete_service(&self, name: ServiceName) -> Result<bool> {
        self.remove_service(name).await
    }

    async fn insert_metric(&self, sample: NewMetricSample) -> Result<MetricSample> {
        self.store_metric(sample).await
    }

    async fn query_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricSample>> {
        self.find_metrics(filter).await
    }

    async fn delete_metrics_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.prune_metrics(cutoff).await
    }

    async fn insert_pipeline_run(&self, run: NewPipelineRun) -> Result<PipelineRun> {
        self.store_pipeline_run(run).await
    }

    async fn update_pipeline_run(&self, run: &PipelineRun) -> Result<()> {
        self.save_pipeline_run(run).await
    }

    async fn get_pipeline_run(&self, id: i64) -> Result<Option<PipelineRun>> {
        self.find_pipeline_run(id).await
    }

    async fn query_pipeline_runs(&self, filter: &PipelineFilter) -> Result<Vec<PipelineRun>> {
        self.find_pipeline_runs(filter).await
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert> {
        self.store_alert(alert).await
    }

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>> {
        self.find_alert(id).await
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        self.save_alert(alert).await
    }

    async fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.find_alerts(filter, None).await
    }

    async fn has_alert(&self, filter: &AlertFilter) -> Result<bool> {
        Ok(!self.find_alerts(filter, Some(1)).await?.is_empty())
    }

    async fn health_check(&self) -> Result<()> {
        self.ping().await
    }
}
