use crate::core::models::{MonitoredService, ServiceName};
use crate::utils::error::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, alert, metric_sample, service};
use super::connection::store_error;
use super::convert::service_from_model;
use super::types::SeaOrmStore;

impl SeaOrmStore {
    /// Insert or replace a service row
    pub(super) async fn save_service(&self, svc: &MonitoredService) -> Result<()> {
        let active_model = service::ActiveModel {
            name: Set(svc.name.as_str().to_string()),
            status: Set(svc.status.as_str().to_string()),
            endpoint: Set(svc.endpoint.clone()),
            last_check: Set(svc.last_check),
            last_status_change: Set(svc.last_status_change),
            created_at: Set(svc.created_at),
        };

        entities::Service::insert(active_model)
            .on_conflict(
                OnConflict::column(service::Column::Name)
                    .update_columns([
                        service::Column::Status,
                        service::Column::Endpoint,
                        service::Column::LastCheck,
                        service::Column::LastStatusChange,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    pub(super) async fn find_service(&self, name: ServiceName) -> Result<Option<MonitoredService>> {
        entities::Service::find_by_id(name.as_str().to_string())
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(service_from_model)
            .transpose()
    }

    pub(super) async fn all_services(&self) -> Result<Vec<MonitoredService>> {
        entities::Service::find()
            .order_by_asc(service::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(service_from_model)
            .collect()
    }

    /// Remove a service, its samples, and detach its alerts
    pub(super) async fn remove_service(&self, name: ServiceName) -> Result<bool> {
        debug!("Deleting service: {}", name);
        let key = name.as_str().to_string();
        let txn = self.db.begin().await.map_err(store_error)?;

        entities::MetricSample::delete_many()
            .filter(metric_sample::Column::Service.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(store_error)?;

        entities::Alert::update_many()
            .col_expr(alert::Column::Service, Expr::value(Option::<String>::None))
            .filter(alert::Column::Service.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(store_error)?;

        let result = entities::Service::delete_by_id(key)
            .exec(&txn)
            .await
            .map_err(store_error)?;

        txn.commit().await.map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }
}
