use crate::core::models::{NewPipelineRun, PipelineFilter, PipelineRun};
use crate::utils::error::{MonitorError, Result};
use sea_orm::*;

use super::super::entities::{self, pipeline_run};
use super::connection::store_error;
use super::convert::{metadata_to_json, pipeline_run_from_model};
use super::types::SeaOrmStore;

impl SeaOrmStore {
    pub(super) async fn store_pipeline_run(&self, run: NewPipelineRun) -> Result<PipelineRun> {
        let active_model = pipeline_run::ActiveModel {
            id: NotSet,
            pipeline_type: Set(run.pipeline_type.as_str().to_string()),
            status: Set(run.status.as_str().to_string()),
            start_time: Set(run.start_time),
            end_time: Set(run.end_time),
            error_message: Set(run.error_message.clone()),
            metadata: Set(metadata_to_json(&run.metadata)),
        };

        let result = entities::PipelineRun::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(run.into_run(result.last_insert_id))
    }

    pub(super) async fn save_pipeline_run(&self, run: &PipelineRun) -> Result<()> {
        let active_model = pipeline_run::ActiveModel {
            id: Unchanged(run.id),
            pipeline_type: Set(run.pipeline_type.as_str().to_string()),
            status: Set(run.status.as_str().to_string()),
            start_time: Set(run.start_time),
            end_time: Set(run.end_time),
            error_message: Set(run.error_message.clone()),
            metadata: Set(metadata_to_json(&run.metadata)),
        };

        match active_model.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(MonitorError::not_found(format!(
                "Pipeline run {} not found",
                run.id
            ))),
            Err(e) => Err(store_error(e)),
        }
    }

    pub(super) async fn find_pipeline_run(&self, id: i64) -> Result<Option<PipelineRun>> {
        entities::PipelineRun::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(pipeline_run_from_model)
            .transpose()
    }

    pub(super) async fn find_pipeline_runs(
        &self,
        filter: &PipelineFilter,
    ) -> Result<Vec<PipelineRun>> {
        let mut query = entities::PipelineRun::find();

        if let Some(pipeline_type) = filter.pipeline_type {
            query = query.filter(pipeline_run::Column::PipelineType.eq(pipeline_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(pipeline_run::Column::Status.eq(status.as_str()));
        }
        if let Some(before) = filter.started_before {
            query = query.filter(pipeline_run::Column::StartTime.lt(before));
        }
        if let Some(since) = filter.ended_since {
            query = query.filter(pipeline_run::Column::EndTime.gte(since));
        }

        query
            .order_by_desc(pipeline_run::Column::StartTime)
            .order_by_desc(pipeline_run::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(pipeline_run_from_model)
            .collect()
    }
}
