//! Health check endpoint for the monitor itself

use crate::core::models::ServiceStatus;
use crate::monitoring::SinkStats;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/health/", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: Cow<'static, str>,
    uptime_seconds: u64,
    store_healthy: bool,
    services: ServiceSummary,
    alerts: SinkStats,
}

#[derive(Debug, Default, Serialize)]
struct ServiceSummary {
    total: usize,
    up: usize,
    down: usize,
    unknown: usize,
}

/// Liveness of the monitor
///
/// Always answers 200 while the process runs; a failing store is reported
/// as `degraded`.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let monitor = &state.monitor;
    let store_healthy = match monitor.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Store health check failed: {}", e);
            false
        }
    };

    let mut services = ServiceSummary::default();
    if store_healthy {
        if let Ok(list) = monitor.services().await {
            for service in &list {
                match service.status {
                    ServiceStatus::Up => services.up += 1,
                    ServiceStatus::Down => services.down += 1,
                    ServiceStatus::Unknown => services.unknown += 1,
                }
            }
            services.total = list.len();
        }
    }

    let health_status = HealthStatus {
        status: if store_healthy {
            Cow::Borrowed("healthy")
        } else {
            Cow::Borrowed("degraded")
        },
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        uptime_seconds: monitor.uptime().as_secs(),
        store_healthy,
        services,
        alerts: monitor.alerts().stats(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(health_status)))
}
