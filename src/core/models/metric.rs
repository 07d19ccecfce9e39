//! Metric sample model

use super::service::ServiceName;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known metric type tags
pub mod metric_types {
    pub const CPU: &str = "cpu";
    pub const MEMORY: &str = "memory";
    pub const DISK: &str = "disk";
    pub const RESPONSE_TIME: &str = "response_time";
}

const MAX_METRIC_TYPE_LEN: usize = 50;

/// A single immutable metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub id: i64,
    pub service: ServiceName,
    pub metric_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// A metric sample that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMetricSample {
    pub service: ServiceName,
    pub metric_type: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewMetricSample {
    pub fn new(
        service: ServiceName,
        metric_type: impl Into<String>,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            service,
            metric_type: metric_type.into(),
            value,
            timestamp,
        }
    }

    /// Reject malformed samples before they reach the store
    pub fn validate(&self) -> Result<()> {
        let metric_type = self.metric_type.trim();
        if metric_type.is_empty() {
            return Err(MonitorError::validation("metric_type cannot be empty"));
        }
        if metric_type.len() > MAX_METRIC_TYPE_LEN {
            return Err(MonitorError::validation(format!(
                "metric_type cannot exceed {} characters",
                MAX_METRIC_TYPE_LEN
            )));
        }
        if !self.value.is_finite() {
            return Err(MonitorError::validation("metric value must be a finite number"));
        }
        Ok(())
    }

    pub fn into_sample(self, id: i64) -> MetricSample {
        MetricSample {
            id,
            service: self.service,
            metric_type: self.metric_type,
            value: self.value,
            timestamp: self.timestamp,
        }
    }
}

/// Range query over metric samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFilter {
    pub service: Option<ServiceName>,
    pub metric_type: Option<String>,
    /// Inclusive lower bound
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub until: Option<DateTime<Utc>>,
}

impl MetricFilter {
    pub fn for_service(service: ServiceName) -> Self {
        Self {
            service: Some(service),
            ..Default::default()
        }
    }

    pub fn with_metric_type(mut self, metric_type: impl Into<String>) -> Self {
        self.metric_type = Some(metric_type.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn matches(&self, sample: &MetricSample) -> bool {
        self.service.is_none_or(|s| s == sample.service)
            && self
                .metric_type
                .as_deref()
                .is_none_or(|t| t == sample.metric_type)
            && self.since.is_none_or(|since| sample.timestamp >= since)
            && self.until.is_none_or(|until| sample.timestamp <= until)
    }
}
