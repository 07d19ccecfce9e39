//! Pipeline run model

use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Kinds of batch/ML pipelines reporting to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineType {
    DataIngestion,
    Preprocessing,
    Training,
    Evaluation,
    Inference,
}

impl PipelineType {
    pub const ALL: [PipelineType; 5] = [
        PipelineType::DataIngestion,
        PipelineType::Preprocessing,
        PipelineType::Training,
        PipelineType::Evaluation,
        PipelineType::Inference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineType::DataIngestion => "data_ingestion",
            PipelineType::Preprocessing => "preprocessing",
            PipelineType::Training => "training",
            PipelineType::Evaluation => "evaluation",
            PipelineType::Inference => "inference",
        }
    }
}

impl fmt::Display for PipelineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineType {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        PipelineType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MonitorError::validation(format!("Unknown pipeline type: {}", s)))
    }
}

/// Lifecycle status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Running,
    #[serde(alias = "completed")]
    Success,
    Failed,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Success => "success",
            PipelineStatus::Failed => "failed",
        }
    }

    /// Success and failure end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStatus::Success | PipelineStatus::Failed)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(PipelineStatus::Pending),
            "running" => Ok(PipelineStatus::Running),
            "success" | "completed" => Ok(PipelineStatus::Success),
            "failed" => Ok(PipelineStatus::Failed),
            other => Err(MonitorError::validation(format!(
                "Invalid pipeline status: {}",
                other
            ))),
        }
    }
}

/// One execution of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: i64,
    pub pipeline_type: PipelineType,
    pub status: PipelineStatus,
    pub start_time: DateTime<Utc>,
    /// Set once the run reaches a terminal status
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PipelineRun {
    /// Apply a status update reported by the pipeline
    ///
    /// Terminal runs are frozen; an update against one is a conflict.
    pub fn apply_update(
        &mut self,
        status: PipelineStatus,
        error_message: Option<String>,
        metadata: HashMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(MonitorError::Conflict(format!(
                "Pipeline run {} already finished with status {}",
                self.id, self.status
            )));
        }

        self.status = status;
        if status.is_terminal() {
            self.end_time = Some(now);
        }
        if error_message.is_some() {
            self.error_message = error_message;
        }
        self.metadata.extend(metadata);
        Ok(())
    }

    /// How long the run has been going, or went on for
    pub fn duration(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }
}

/// A pipeline run that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewPipelineRun {
    pub pipeline_type: PipelineType,
    pub status: PipelineStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewPipelineRun {
    /// Start notification for a new run
    ///
    /// A run reported directly in a terminal status starts and ends at `now`.
    pub fn started(pipeline_type: PipelineType, status: PipelineStatus, now: DateTime<Utc>) -> Self {
        Self {
            pipeline_type,
            status,
            start_time: now,
            end_time: status.is_terminal().then_some(now),
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_error(mut self, error_message: Option<String>) -> Self {
        self.error_message = error_message;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn into_run(self, id: i64) -> PipelineRun {
        PipelineRun {
            id,
            pipeline_type: self.pipeline_type,
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            error_message: self.error_message,
            metadata: self.metadata,
        }
    }
}

/// Range query over pipeline runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineFilter {
    pub pipeline_type: Option<PipelineType>,
    pub status: Option<PipelineStatus>,
    /// Runs started strictly before this instant
    pub started_before: Option<DateTime<Utc>>,
    /// Runs that ended at or after this instant
    pub ended_since: Option<DateTime<Utc>>,
}

impl PipelineFilter {
    pub fn with_status(status: PipelineStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn matches(&self, run: &PipelineRun) -> bool {
        self.pipeline_type.is_none_or(|t| t == run.pipeline_type)
            && self.status.is_none_or(|s| s == run.status)
            && self.started_before.is_none_or(|b| run.start_time < b)
            && self
                .ended_since
                .is_none_or(|since| run.end_time.is_some_and(|end| end >= since))
    }
}
