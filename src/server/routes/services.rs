//! Service status endpoints

use crate::core::models::{ServiceName, ServiceStatus};
use crate::server::routes::{ApiResponse, list_response};
use crate::server::state::AppState;
use crate::utils::error::MonitorError;
use crate::utils::is_valid_url;
use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

/// Configure service routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("/", web::get().to(list_services))
            .route("", web::post().to(update_status))
            .route("/", web::post().to(update_status))
            .route("/{name}", web::delete().to(remove_service))
            .route("/{name}/", web::delete().to(remove_service)),
    );
}

/// Pushed status update
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub name: String,
    pub status: ServiceStatus,
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// List every registered service, ordered by name
async fn list_services(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let services = state.monitor.services().await?;
    Ok(HttpResponse::Ok().json(list_response(services)))
}

/// Register a service or feed it a pushed status
async fn update_status(
    state: web::Data<AppState>,
    request: web::Json<StatusUpdateRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    let name: ServiceName = request.name.parse()?;

    let endpoint = match request.endpoint {
        Some(endpoint) if endpoint.trim().is_empty() => None,
        Some(endpoint) if !is_valid_url(&endpoint) => {
            return Err(MonitorError::validation(format!("Invalid endpoint URL: {}", endpoint)).into());
        }
        other => other,
    };

    debug!(service = %name, status = %request.status, "status pushed");
    let service = state
        .monitor
        .health()
        .report_status(name, request.status, endpoint, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(service)))
}

/// Remove a service together with its metric samples
async fn remove_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name: ServiceName = path.into_inner().parse()?;
    if !state.monitor.remove_service(name).await? {
        return Err(MonitorError::not_found(format!("Service {} is not registered", name)).into());
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({ "removed": name }))))
}
