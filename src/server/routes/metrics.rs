//! Metric ingestion and query endpoints

use crate::core::models::{MetricFilter, NewMetricSample, ServiceName};
use crate::server::routes::{ApiResponse, list_response};
use crate::server::state::AppState;
use crate::utils::error::MonitorError;
use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Configure metric routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/metrics")
            .route("", web::get().to(query_metrics))
            .route("/", web::get().to(query_metrics))
            .route("", web::post().to(ingest_metric))
            .route("/", web::post().to(ingest_metric)),
    );
}

/// A metric sample pushed by a client
#[derive(Debug, Deserialize)]
pub struct MetricRequest {
    pub service: String,
    pub metric_type: String,
    pub value: f64,
    /// Defaults to the time of receipt
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Query string of `GET /metrics/`
#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    pub hours: Option<i64>,
    pub service: Option<String>,
    pub metric_type: Option<String>,
}

impl MetricQuery {
    fn into_filter(self, now: DateTime<Utc>) -> Result<MetricFilter, MonitorError> {
        let hours = self.hours.unwrap_or(DEFAULT_WINDOW_HOURS);
        if hours <= 0 {
            return Err(MonitorError::validation("hours must be positive"));
        }

        let since = Duration::try_hours(hours)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| MonitorError::validation("hours is out of range"))?;

        let mut filter = MetricFilter::default().since(since);
        if let Some(service) = self.service {
            filter.service = Some(service.parse::<ServiceName>()?);
        }
        if let Some(metric_type) = self.metric_type {
            filter = filter.with_metric_type(metric_type);
        }
        Ok(filter)
    }
}

async fn ingest_metric(
    state: web::Data<AppState>,
    request: web::Json<MetricRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    let service: ServiceName = request.service.parse()?;

    let sample = state
        .monitor
        .store()
        .insert_metric(NewMetricSample::new(
            service,
            request.metric_type,
            request.value,
            request.timestamp.unwrap_or_else(Utc::now),
        ))
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(sample)))
}

/// Samples inside the trailing window, newest first
async fn query_metrics(
    state: web::Data<AppState>,
    query: web::Query<MetricQuery>,
) -> ActixResult<HttpResponse> {
    let filter = query.into_inner().into_filter(Utc::now())?;
    let samples = state.monitor.store().query_metrics(&filter).await?;
    Ok(HttpResponse::Ok().json(list_response(samples)))
}
