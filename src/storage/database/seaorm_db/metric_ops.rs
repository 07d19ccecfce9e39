use crate::core::models::{MetricFilter, MetricSample, NewMetricSample};
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, metric_sample};
use super::connection::store_error;
use super::convert::metric_from_model;
use super::types::SeaOrmStore;

impl SeaOrmStore {
    pub(super) async fn store_metric(&self, sample: NewMetricSample) -> Result<MetricSample> {
        sample.validate()?;

        if self.find_service(sample.service).await?.is_none() {
            return Err(MonitorError::not_found(format!(
                "Service {} is not registered",
                sample.service
            )));
        }

        let active_model = metric_sample::ActiveModel {
            id: NotSet,
            service: Set(sample.service.as_str().to_string()),
            metric_type: Set(sample.metric_type.clone()),
            value: Set(sample.value),
            timestamp: Set(sample.timestamp),
        };

        let result = entities::MetricSample::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(sample.into_sample(result.last_insert_id))
    }

    pub(super) async fn find_metrics(&self, filter: &MetricFilter) -> Result<Vec<MetricSample>> {
        let mut query = entities::MetricSample::find();

        if let Some(service) = filter.service {
            query = query.filter(metric_sample::Column::Service.eq(service.as_str()));
        }
        if let Some(metric_type) = &filter.metric_type {
            query = query.filter(metric_sample::Column::MetricType.eq(metric_type.as_str()));
        }
        if let Some(since) = filter.since {
            query = query.filter(metric_sample::Column::Timestamp.gte(since));
        }
        if let Some(until) = filter.until {
            query = query.filter(metric_sample::Column::Timestamp.lte(until));
        }

        query
            .order_by_desc(metric_sample::Column::Timestamp)
            .order_by_desc(metric_sample::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(metric_from_model)
            .collect()
    }

    pub(super) async fn prune_metrics(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        debug!("Deleting metric samples before {}", cutoff);
        let result = entities::MetricSample::delete_many()
            .filter(metric_sample::Column::Timestamp.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected)
    }
}
