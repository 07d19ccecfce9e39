//! In-memory store
//!
//! Used when the database is disabled and throughout the test suite.

use super::MonitorStore;
use crate::core::models::{
    Alert, AlertFilter, MetricFilter, MetricSample, MonitoredService, NewAlert, NewMetricSample,
    NewPipelineRun, PipelineFilter, PipelineRun, ServiceName,
};
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Tables {
    services: BTreeMap<ServiceName, MonitoredService>,
    metrics: Vec<MetricSample>,
    pipeline_runs: BTreeMap<i64, PipelineRun>,
    alerts: BTreeMap<i64, Alert>,
    next_metric_id: i64,
    next_run_id: i64,
    next_alert_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored metric samples
    pub fn metric_count(&self) -> usize {
        self.tables.read().metrics.len()
    }
}

#[async_trait]
impl MonitorStore for MemoryStore {
    async fn upsert_service(&self, service: &MonitoredService) -> Result<()> {
        self.tables
            .write()
            .services
            .insert(service.name, service.clone());
        Ok(())
    }

    async fn get_service(&self, name: ServiceName) -> Result<Option<MonitoredService>> {
        Ok(self.tables.read().services.get(&name).cloned())
    }

    async fn list_services(&self) -> Result<Vec<MonitoredService>> {
        Ok(self.tables.read().services.values().cloned().collect())
    }

    async fn delete_service(&self, name: ServiceName) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.services.remove(&name).is_none() {
            return Ok(false);
        }
        tables.metrics.retain(|m| m.service != name);
        for alert in tables.alerts.values_mut() {
            if alert.service == Some(name) {
                alert.service = None;
            }
        }
        Ok(true)
    }

    async fn insert_metric(&self, sample: NewMetricSample) -> Result<MetricSample> {
        sample.validate()?;
        let mut tables = self.tables.write();
        if !tables.services.contains_key(&sample.service) {
            return Err(MonitorError::not_found(format!(
                "Service {} is not registered",
                sample.service
            )));
        }
        let id = Tables::next_id(&mut tables.next_metric_id);
        let sample = sample.into_sample(id);
        tables.metrics.push(sample.clone());
        Ok(sample)
    }

    async fn query_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricSample>> {
        let tables = self.tables.read();
        let mut samples: Vec<MetricSample> = tables
            .metrics
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        samples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(samples)
    }

    async fn delete_metrics_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write();
        let before = tables.metrics.len();
        tables.metrics.retain(|m| m.timestamp >= cutoff);
        Ok((before - tables.metrics.len()) as u64)
    }

    async fn insert_pipeline_run(&self, run: NewPipelineRun) -> Result<PipelineRun> {
        let mut tables = self.tables.write();
        let id = Tables::next_id(&mut tables.next_run_id);
        let run = run.into_run(id);
        tables.pipeline_runs.insert(id, run.clone());
        Ok(run)
    }

    async fn update_pipeline_run(&self, run: &PipelineRun) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.pipeline_runs.get_mut(&run.id) {
            Some(existing) => {
                *existing = run.clone();
                Ok(())
            }
            None => Err(MonitorError::not_found(format!(
                "Pipeline run {} not found",
                run.id
            ))),
        }
    }

    async fn get_pipeline_run(&self, id: i64) -> Result<Option<PipelineRun>> {
        Ok(self.tables.read().pipeline_runs.get(&id).cloned())
    }

    async fn query_pipeline_runs(&self, filter: &PipelineFilter) -> Result<Vec<PipelineRun>> {
        let tables = self.tables.read();
        let mut runs: Vec<PipelineRun> = tables
            .pipeline_runs
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(runs)
    }

    async fn insert_alert(&self, alert: NewAlert) -> Result<Alert> {
        alert.validate()?;
        let mut tables = self.tables.write();
        if let Some(service) = alert.service {
            if !tables.services.contains_key(&service) {
                return Err(MonitorError::not_found(format!(
                    "Service {} is not registered",
                    service
                )));
            }
        }
        let id = Tables::next_id(&mut tables.next_alert_id);
        let alert = alert.into_alert(id);
        tables.alerts.insert(id, alert.clone());
        Ok(alert)
    }

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>> {
        Ok(self.tables.read().alerts.get(&id).cloned())
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.alerts.get_mut(&alert.id) {
            Some(existing) => {
                *existing = alert.clone();
                Ok(())
            }
            None => Err(MonitorError::not_found(format!(
                "Alert {} not found",
                alert.id
            ))),
        }
    }

    async fn query_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let tables = self.tables.read();
        let mut alerts: Vec<Alert> = tables
            .alerts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn has_alert(&self, filter: &AlertFilter) -> Result<bool> {
        Ok(self.tables.read().alerts.values().any(|a| filter.matches(a)))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
