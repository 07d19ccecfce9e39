//! Pipeline run endpoints

use crate::core::models::{PipelineFilter, PipelineStatus, PipelineType};
use crate::monitoring::PipelineUpdate;
use crate::server::routes::{ApiResponse, list_response};
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::Utc;
use serde::Deserialize;

/// Configure pipeline routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pipelines")
            .route("", web::get().to(query_runs))
            .route("/", web::get().to(query_runs))
            .route("", web::post().to(report_run))
            .route("/", web::post().to(report_run)),
    );
}

/// Query string of `GET /pipelines/`
#[derive(Debug, Deserialize)]
pub struct PipelineQuery {
    #[serde(rename = "type")]
    pub pipeline_type: Option<String>,
    pub status: Option<String>,
}

/// Start or update a pipeline run
async fn report_run(
    state: web::Data<AppState>,
    update: web::Json<PipelineUpdate>,
) -> ActixResult<HttpResponse> {
    let run = state
        .monitor
        .pipelines()
        .report(update.into_inner(), Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(run)))
}

/// Runs matching the filters, newest first
async fn query_runs(
    state: web::Data<AppState>,
    query: web::Query<PipelineQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PipelineFilter {
        pipeline_type: query
            .pipeline_type
            .as_deref()
            .map(str::parse::<PipelineType>)
            .transpose()?,
        status: query
            .status
            .as_deref()
            .map(str::parse::<PipelineStatus>)
            .transpose()?,
        ..Default::default()
    };

    let runs = state.monitor.store().query_pipeline_runs(&filter).await?;
    Ok(HttpResponse::Ok().json(list_response(runs)))
}
