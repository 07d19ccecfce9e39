//! Store double that can be switched into an outage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_monitor::core::models::{
    Alert, AlertFilter, MetricFilter, MetricSample, MonitoredService, NewAlert, NewMetricSample,
    NewPipelineRun, PipelineFilter, PipelineRun, ServiceName,
};
use fleet_monitor::storage::{MemoryStore, MonitorStore};
use fleet_monitor::utils::error::{MonitorError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// [`MemoryStore`] whose alert inserts, or every call, fail while switched off
#[derive(Debug, Default)]
pub struct OutageStore {
    inner: MemoryStore,
    alert_writes_down: AtomicBool,
    down: AtomicBool,
    rejected_alerts: AtomicUsize,
}

impl OutageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `insert_alert` while `failing` is set
    pub fn fail_alert_writes(&self, failing: bool) {
        self.alert_writes_down.store(failing, Ordering::SeqCst);
    }

    /// Fail every call while `failing` is set
    pub fn fail_everything(&self, failing: bool) {
        self.down.store(failing, Ordering::SeqCst);
    }

    /// Alert inserts refused so far
    pub fn rejected_alerts(&self) -> usize {
        self.rejected_alerts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(MonitorError::store_unavailable("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl MonitorStore for OutageStore {
    async fn upsert_service(&self, service: &MonitoredService) -> Result<()> {
        self.check()?;
        self.inner.upsert_service(service).await
    }

    async fn get_service(&self, name: ServiceName) -> Result<Option<MonitoredService>> {
        self.check()?;
        self.inner.get_service(name).await
    }

    async fn list_services(&self) -> Result<Vec<MonitoredService>> {
        self.check()?;
        self.inner.list_services().await
    }

    async fn delete_service(&self, name: ServiceName) -> Result<bool> {
        self.check()?;
        self.inner.delete_service(name).await
    }

    async fn insert_metric(&self, sample: NewMetricSample) -> Result<MetricSample> {
        self.check()?;
        self.inner.insert_metric(sample).await
    }

    async fn query_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricSample>> {
        self.check()?;
        self.inner.query_metrics(filter).await
    }

    async fn delete_metrics_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.check()?;
        self.inner.delete_metrics_before(cutoff).await
    }

    async fn insert_pipeline_run(&self, run: NewPipelineRun) -> Result<PipelineRun> {
        self.check()?;
        self.inner.insert_pipeline_run(run).await
    }

    async fn update_pipeline_run(&self, run: &PipelineRun) -> Result<()> {
        self.check()?;
        self.inner.update_pipeline_run(run).await
    }

    async fn get_pipeline_run(&self, id: i64) -> Result<Option<PipelineRun>> {
        self.check()?;
        self.inner.get_pipeline_run(id).await
    }

    async fn query_pipeline_runs(&self, filter: &PipelineFilter) -> Result<Vec<PipelineRun>> {
        self.check()?;
        self.inner.query_pipeline_runs(filter).await
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert> {
        self.check()?;
        if self.alert_writes_down.load(Ordering::SeqCst) {
            self.rejected_alerts.fetch_add(1, Ordering::SeqCst);
            return Err(MonitorError::store_unavailable("alerts table is locked"));
        }
        self.inner.insert_alert(alert).await
    }

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>> {
        self.check()?;
        self.inner.get_alert(id).await
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        self.check()?;
        self.inner.update_alert(alert).await
    }

    async fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.check()?;
        self.inner.query_alerts(filter).await
    }

    async fn health_check(&self) -> Result<()> {
        self.check()?;
        self.inner.health_check().await
    }
}
