//! Wire types exchanged with the monitor

use crate::core::models::{PipelineStatus, PipelineType, ServiceName, ServiceStatus, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `POST services/`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport<'a> {
    pub name: ServiceName,
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<&'a str>,
}

/// `POST metrics/`
#[derive(Debug, Clone, Serialize)]
pub struct MetricReport<'a> {
    pub service: ServiceName,
    pub metric_type: &'a str,
    pub value: f64,
}

/// `POST pipelines/`
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub pipeline_type: PipelineType,
    pub status: PipelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<i64>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PipelineReport {
    pub fn new(pipeline_type: PipelineType, status: PipelineStatus) -> Self {
        Self {
            pipeline_type,
            status,
            run_id: None,
            metadata: HashMap::new(),
            error_message: None,
        }
    }

    pub fn for_run(mut self, run_id: i64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self
    }
}

/// `POST alerts/`
#[derive(Debug, Clone, Serialize)]
pub struct AlertReport<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub severity: Severity,
    pub service: ServiceName,
}

/// Response envelope of the monitor's HTTP surface
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}
