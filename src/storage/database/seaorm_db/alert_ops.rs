use crate::core::models::{Alert, AlertFilter, NewAlert};
use crate::utils::error::{MonitorError, Result};
use sea_orm::*;

use super::super::entities::{self, alert};
use super::connection::store_error;
use super::convert::alert_from_model;
use super::types::SeaOrmStore;

impl SeaOrmStore {
    pub(super) async fn store_alert(&self, new_alert: NewAlert) -> Result<Alert> {
        new_alert.validate()?;

        if let Some(service) = new_alert.service {
            if self.find_service(service).await?.is_none() {
                return Err(MonitorError::not_found(format!(
                    "Service {} is not registered",
                    service
                )));
            }
        }

        let active_model = alert::ActiveModel {
            id: NotSet,
            service: Set(new_alert.service.map(|s| s.as_str().to_string())),
            pipeline_run: Set(new_alert.pipeline_run),
            title: Set(new_alert.title.clone()),
            message: Set(new_alert.message.clone()),
            severity: Set(i16::from(new_alert.severity.level())),
            timestamp: Set(new_alert.timestamp),
            acknowledged: Set(false),
            acknowledged_by: Set(None),
            acknowledged_at: Set(None),
        };

        let result = entities::Alert::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(new_alert.into_alert(result.last_insert_id))
    }

    pub(super) async fn find_alert(&self, id: i64) -> Result<Option<Alert>> {
        entities::Alert::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(alert_from_model)
            .transpose()
    }

    /// Only acknowledgement fields are mutable
    pub(super) async fn save_alert(&self, updated: &Alert) -> Result<()> {
        let active_model = alert::ActiveModel {
            id: Unchanged(updated.id),
            acknowledged: Set(updated.acknowledged),
            acknowledged_by: Set(updated.acknowledged_by.clone()),
            acknowledged_at: Set(updated.acknowledged_at),
            ..Default::default()
        };

        match active_model.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(MonitorError::not_found(format!(
                "Alert {} not found",
                updated.id
            ))),
            Err(e) => Err(store_error(e)),
        }
    }

    pub(super) async fn find_alerts(
        &self,
        filter: &AlertFilter,
        limit: Option<u64>,
    ) -> Result<Vec<Alert>> {
        let mut query = entities::Alert::find();

        if let Some(acknowledged) = filter.acknowledged {
            query = query.filter(alert::Column::Acknowledged.eq(acknowledged));
        }
        if let Some(severity) = filter.severity {
            query = query.filter(alert::Column::Severity.eq(i16::from(severity.level())));
        }
        if let Some(service) = filter.service {
            query = query.filter(alert::Column::Service.eq(service.as_str()));
        }
        if let Some(run_id) = filter.pipeline_run {
            query = query.filter(alert::Column::PipelineRun.eq(run_id));
        }
        if let Some(title) = &filter.title {
            query = query.filter(alert::Column::Title.eq(title.as_str()));
        }
        if let Some(since) = filter.since {
            query = query.filter(alert::Column::Timestamp.gte(since));
        }

        query
            .order_by_desc(alert::Column::Timestamp)
            .order_by_desc(alert::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(alert_from_model)
            .collect()
    }
}
