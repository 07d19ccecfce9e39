//! Pipeline monitor
//!
//! Tracks pipeline runs reported by the pipelines themselves and sweeps for
//! two conditions: runs stuck in `running` past the stuck threshold, and runs
//! that failed within the trailing failure window. Each condition alerts at
//! most once per run; the stored alert is the record of that.

use crate::config::PipelineMonitorConfig;
use crate::core::models::{
    AlertFilter, NewAlert, NewPipelineRun, PipelineFilter, PipelineRun, PipelineStatus,
    PipelineType, Severity,
};
use crate::monitoring::alerts::AlertSink;
use crate::monitoring::locks::{EntityKey, EntityLocks};
use crate::storage::MonitorStore;
use crate::utils::error::{MonitorError, Result};
use crate::utils::truncate_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Title of the stuck-run alert
pub const STUCK_ALERT_TITLE: &str = "Pipeline Stuck";
/// Title of the failed-run alert
pub const FAILURE_ALERT_TITLE: &str = "Pipeline Failure";

const MAX_ERROR_TEXT: usize = 1000;

/// A status report from a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineUpdate {
    /// Run to update; when absent the latest unfinished run of the type is used
    #[serde(default)]
    pub run_id: Option<i64>,
    pub pipeline_type: PipelineType,
    pub status: PipelineStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PipelineUpdate {
    pub fn new(pipeline_type: PipelineType, status: PipelineStatus) -> Self {
        Self {
            run_id: None,
            pipeline_type,
            status,
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    pub fn for_run(mut self, run_id: i64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self
    }
}

/// Tally of one pipeline sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSweepReport {
    pub stuck_alerts: usize,
    pub failure_alerts: usize,
    pub errors: usize,
}

/// Stuck and failed run detection
pub struct PipelineMonitor {
    config: PipelineMonitorConfig,
    store: Arc<dyn MonitorStore>,
    locks: Arc<EntityLocks>,
    sink: Arc<AlertSink>,
}

impl PipelineMonitor {
    pub fn new(
        config: PipelineMonitorConfig,
        store: Arc<dyn MonitorStore>,
        locks: Arc<EntityLocks>,
        sink: Arc<AlertSink>,
    ) -> Self {
        Self {
            config,
            store,
            locks,
            sink,
        }
    }

    /// Apply a pipeline status report
    ///
    /// Without a run id the most recent unfinished run of the same type is
    /// updated, or a new run is started when there is none.
    pub async fn report(&self, update: PipelineUpdate, now: DateTime<Utc>) -> Result<PipelineRun> {
        // Held across lookup and insert so concurrent reports of one type
        // cannot both start a run
        let _type_guard;
        let run_id = match update.run_id {
            Some(id) => Some(id),
            None => {
                _type_guard = self
                    .locks
                    .lock(EntityKey::Pipeline(update.pipeline_type))
                    .await;
                self.latest_open_run(update.pipeline_type).await?
            }
        };

        let Some(run_id) = run_id else {
            let run = self
                .store
                .insert_pipeline_run(
                    NewPipelineRun::started(update.pipeline_type, update.status, now)
                        .with_error(update.error_message)
                        .with_metadata(update.metadata),
                )
                .await?;
            info!(
                run_id = run.id,
                pipeline_type = %run.pipeline_type,
                status = %run.status,
                "pipeline run started"
            );
            return Ok(run);
        };

        let _guard = self.locks.lock(EntityKey::PipelineRun(run_id)).await;
        let mut run = self
            .store
            .get_pipeline_run(run_id)
            .await?
            .ok_or_else(|| MonitorError::not_found(format!("Pipeline run {} not found", run_id)))?;

        if run.pipeline_type != update.pipeline_type {
            return Err(MonitorError::validation(format!(
                "Pipeline run {} is a {} run, not {}",
                run_id, run.pipeline_type, update.pipeline_type
            )));
        }

        run.apply_update(update.status, update.error_message, update.metadata, now)?;
        self.store.update_pipeline_run(&run).await?;
        debug!(run_id, status = %run.status, "pipeline run updated");
        Ok(run)
    }

    async fn latest_open_run(&self, pipeline_type: PipelineType) -> Result<Option<i64>> {
        let runs = self
            .store
            .query_pipeline_runs(&PipelineFilter {
                pipeline_type: Some(pipeline_type),
                ..Default::default()
            })
            .await?;
        Ok(runs
            .into_iter()
            .find(|run| !run.status.is_terminal())
            .map(|run| run.id))
    }

    pub async fn sweep(&self) -> Result<PipelineSweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Run both detection rules evaluated at `now`
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<PipelineSweepReport> {
        let mut report = PipelineSweepReport::default();

        let stuck = self
            .store
            .query_pipeline_runs(&PipelineFilter {
                status: Some(PipelineStatus::Running),
                started_before: Some(now - self.config.stuck_threshold()),
                ..Default::default()
            })
            .await?;
        for run in stuck {
            match self.alert_once(&run, STUCK_ALERT_TITLE, now).await {
                Ok(true) => report.stuck_alerts += 1,
                Ok(false) => {}
                Err(e) => {
                    report.errors += 1;
                    warn!(run_id = run.id, "Stuck pipeline check failed: {}", e);
                }
            }
        }

        let failed = self
            .store
            .query_pipeline_runs(&PipelineFilter {
                status: Some(PipelineStatus::Failed),
                ended_since: Some(now - self.config.failure_window()),
                ..Default::default()
            })
            .await?;
        for run in failed {
            match self.alert_once(&run, FAILURE_ALERT_TITLE, now).await {
                Ok(true) => report.failure_alerts += 1,
                Ok(false) => {}
                Err(e) => {
                    report.errors += 1;
                    warn!(run_id = run.id, "Failed pipeline check failed: {}", e);
                }
            }
        }

        Ok(report)
    }

    /// Record the alert `title` for `run` unless one already exists
    async fn alert_once(&self, run: &PipelineRun, title: &str, now: DateTime<Utc>) -> Result<bool> {
        let _guard = self.locks.lock(EntityKey::PipelineRun(run.id)).await;
        let existing = AlertFilter::for_pipeline_run(run.id).with_title(title);
        if self.store.has_alert(&existing).await? {
            return Ok(false);
        }

        let (severity, message) = if title == STUCK_ALERT_TITLE {
            let hours = run.duration(now).num_minutes() as f64 / 60.0;
            (
                Severity::Medium,
                format!(
                    "{} pipeline run {} has been running for {:.1} hours (since {})",
                    run.pipeline_type,
                    run.id,
                    hours,
                    run.start_time.format("%Y-%m-%d %H:%M:%S UTC")
                ),
            )
        } else {
            let error = run.error_message.as_deref().unwrap_or("no error message");
            (
                Severity::High,
                format!(
                    "{} pipeline run {} failed: {}",
                    run.pipeline_type,
                    run.id,
                    truncate_string(error, MAX_ERROR_TEXT)
                ),
            )
        };

        self.sink
            .record(NewAlert::new(title, message, severity, now).for_pipeline_run(run.id))
            .await?;
        Ok(true)
    }
}
