//! Core data models for the monitor
//!
//! This module defines the entities tracked by the monitor: registered services,
//! metric samples, pipeline runs and alerts.

pub mod alert;
pub mod metric;
pub mod pipeline;
pub mod service;

// Re-export commonly used types
pub use alert::{Alert, AlertFilter, NewAlert, Severity};
pub use metric::{MetricFilter, MetricSample, NewMetricSample, metric_types};
pub use pipeline::{NewPipelineRun, PipelineFilter, PipelineRun, PipelineStatus, PipelineType};
pub use service::{MonitoredService, ServiceName, ServiceStatus};
