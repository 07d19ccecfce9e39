//! Alert endpoints

use crate::core::models::{AlertFilter, NewAlert, ServiceName, Severity};
use crate::server::routes::{ApiResponse, list_response};
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::Utc;
use serde::Deserialize;

/// Configure alert routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/alerts")
            .route("", web::get().to(list_alerts))
            .route("/", web::get().to(list_alerts))
            .route("", web::post().to(post_alert))
            .route("/", web::post().to(post_alert)),
    );
}

/// Body of `POST /alerts/`: an acknowledgement or a new alert
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AlertRequest {
    Acknowledge {
        alert_id: i64,
        user: String,
    },
    Create {
        title: String,
        #[serde(default)]
        message: String,
        severity: Severity,
        #[serde(default)]
        service: Option<String>,
        #[serde(default)]
        pipeline_run: Option<i64>,
    },
}

/// Query string of `GET /alerts/`
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub acknowledged: Option<bool>,
    /// Level (`1`..`4`) or name (`high`)
    pub severity: Option<String>,
}

async fn post_alert(
    state: web::Data<AppState>,
    request: web::Json<AlertRequest>,
) -> ActixResult<HttpResponse> {
    let sink = state.monitor.alerts();
    let now = Utc::now();

    match request.into_inner() {
        AlertRequest::Acknowledge { alert_id, user } => {
            let alert = sink.acknowledge(alert_id, &user, now).await?;
            Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
        }
        AlertRequest::Create {
            title,
            message,
            severity,
            service,
            pipeline_run,
        } => {
            let mut alert = NewAlert::new(title, message, severity, now);
            if let Some(service) = service {
                alert = alert.for_service(service.parse::<ServiceName>()?);
            }
            if let Some(run_id) = pipeline_run {
                alert = alert.for_pipeline_run(run_id);
            }
            let alert = sink.record(alert).await?;
            Ok(HttpResponse::Created().json(ApiResponse::success(alert)))
        }
    }
}

/// Alerts matching the filters, newest first
async fn list_alerts(
    state: web::Data<AppState>,
    query: web::Query<AlertQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    let filter = AlertFilter {
        acknowledged: query.acknowledged,
        severity: query
            .severity
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?,
        ..Default::default()
    };

    let alerts = state.monitor.store().query_alerts(&filter).await?;
    Ok(HttpResponse::Ok().json(list_response(alerts)))
}
