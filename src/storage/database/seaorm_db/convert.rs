//! Row and domain model conversions

use crate::core::models::{
    Alert, MetricSample, MonitoredService, PipelineRun, ServiceName, Severity,
};
use crate::utils::error::{MonitorError, Result};
use std::collections::HashMap;

use super::super::entities::{alert, metric_sample, pipeline_run, service};

fn corrupt(table: &str, detail: impl std::fmt::Display) -> MonitorError {
    MonitorError::internal(format!("Corrupt {} row: {}", table, detail))
}

pub(super) fn service_from_model(model: service::Model) -> Result<MonitoredService> {
    Ok(MonitoredService {
        name: model.name.parse().map_err(|e| corrupt("services", e))?,
        status: model.status.parse().map_err(|e| corrupt("services", e))?,
        endpoint: model.endpoint,
        last_check: model.last_check,
        last_status_change: model.last_status_change,
        created_at: model.created_at,
    })
}

pub(super) fn metric_from_model(model: metric_sample::Model) -> Result<MetricSample> {
    Ok(MetricSample {
        id: model.id,
        service: model.service.parse().map_err(|e| corrupt("metric_samples", e))?,
        metric_type: model.metric_type,
        value: model.value,
        timestamp: model.timestamp,
    })
}

pub(super) fn pipeline_run_from_model(model: pipeline_run::Model) -> Result<PipelineRun> {
    let metadata: HashMap<String, serde_json::Value> = match model.metadata {
        serde_json::Value::Null => HashMap::new(),
        value => serde_json::from_value(value).map_err(|e| corrupt("pipeline_runs", e))?,
    };

    Ok(PipelineRun {
        id: model.id,
        pipeline_type: model
            .pipeline_type
            .parse()
            .map_err(|e| corrupt("pipeline_runs", e))?,
        status: model.status.parse().map_err(|e| corrupt("pipeline_runs", e))?,
        start_time: model.start_time,
        end_time: model.end_time,
        error_message: model.error_message,
        metadata,
    })
}

pub(super) fn metadata_to_json(metadata: &HashMap<String, serde_json::Value>) -> serde_json::Value {
    serde_json::Value::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

pub(super) fn alert_from_model(model: alert::Model) -> Result<Alert> {
    let service = model
        .service
        .map(|name| name.parse::<ServiceName>())
        .transpose()
        .map_err(|e| corrupt("alerts", e))?;
    let severity = u8::try_from(model.severity)
        .ok()
        .and_then(Severity::from_level)
        .ok_or_else(|| corrupt("alerts", format!("severity {}", model.severity)))?;

    Ok(Alert {
        id: model.id,
        service,
        pipeline_run: model.pipeline_run,
        title: model.title,
        message: model.message,
        severity,
        timestamp: model.timestamp,
        acknowledged: model.acknowledged,
        acknowledged_by: model.acknowledged_by,
        acknowledged_at: model.acknowledged_at,
    })
}
