//! Relational store tests against in-memory SQLite

#[cfg(test)]
mod tests {
    use crate::common::{hours, t0};
    use chrono::Duration;
    use fleet_monitor::MonitorError;
    use fleet_monitor::config::{DatabaseConfig, RetentionConfig};
    use fleet_monitor::core::models::{
        AlertFilter, MetricFilter, MonitoredService, NewAlert, NewMetricSample, NewPipelineRun,
        PipelineFilter, PipelineStatus, PipelineType, ServiceName, ServiceStatus, Severity,
    };
    use fleet_monitor::monitoring::RetentionSweeper;
    use fleet_monitor::storage::{MonitorStore, SeaOrmStore};
    use std::collections::HashMap;
    use std::sync::Arc;

    async fn open() -> SeaOrmStore {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
            enabled: true,
        };
        let store = SeaOrmStore::new(&config).await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    async fn register(store: &SeaOrmStore, name: ServiceName) -> MonitoredService {
        let service = MonitoredService::new(name, None, t0());
        store.upsert_service(&service).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_service_upsert_replaces_row() {
        let store = open().await;
        let mut service = register(&store, ServiceName::DataFetcher).await;
        register(&store, ServiceName::Dashboard).await;

        service.status = ServiceStatus::Down;
        service.endpoint = Some("http://fetcher:8080/health".to_string());
        service.last_check = Some(hours(1));
        service.last_status_change = Some(hours(1));
        store.upsert_service(&service).await.unwrap();

        let stored = store
            .get_service(ServiceName::DataFetcher)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, service);

        let names: Vec<ServiceName> = store
            .list_services()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec![ServiceName::Dashboard, ServiceName::DataFetcher]);
        assert!(store.get_service(ServiceName::Database).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metrics_require_registered_service() {
        let store = open().await;
        let result = store
            .insert_metric(NewMetricSample::new(ServiceName::MlService, "cpu", 1.0, t0()))
            .await;
        assert!(matches!(result, Err(MonitorError::NotFound(_))));

        register(&store, ServiceName::MlService).await;
        let result = store
            .insert_metric(NewMetricSample::new(ServiceName::MlService, " ", 1.0, t0()))
            .await;
        assert!(matches!(result, Err(MonitorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_metric_query_filters_and_order() {
        let store = open().await;
        register(&store, ServiceName::MlService).await;
        register(&store, ServiceName::Dashboard).await;

        for (service, metric_type, offset) in [
            (ServiceName::MlService, "cpu", 0),
            (ServiceName::MlService, "cpu", 2),
            (ServiceName::MlService, "memory", 1),
            (ServiceName::Dashboard, "cpu", 3),
        ] {
            store
                .insert_metric(NewMetricSample::new(service, metric_type, offset as f64, hours(offset)))
                .await
                .unwrap();
        }

        let cpu = store
            .query_metrics(&MetricFilter::for_service(ServiceName::MlService).with_metric_type("cpu"))
            .await
            .unwrap();
        let values: Vec<f64> = cpu.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2.0, 0.0]);

        let recent = store
            .query_metrics(&MetricFilter::default().since(hours(1)))
            .await
            .unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].service, ServiceName::Dashboard);
    }

    #[tokio::test]
    async fn test_retention_keeps_sample_at_cutoff() {
        let store = Arc::new(open().await);
        register(&store, ServiceName::Dashboard).await;

        let now = t0() + Duration::days(30);
        for timestamp in [t0() - Duration::seconds(1), t0(), now] {
            store
                .insert_metric(NewMetricSample::new(ServiceName::Dashboard, "cpu", 5.0, timestamp))
                .await
                .unwrap();
        }

        let sweeper = RetentionSweeper::new(RetentionConfig::default(), store.clone());
        assert_eq!(sweeper.sweep_at(now).await.unwrap(), 1);

        let remaining = store.query_metrics(&MetricFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[1].timestamp, t0());

        // Running again has nothing left to delete
        assert_eq!(sweeper.sweep_at(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_service_cascades() {
        let store = open().await;
        register(&store, ServiceName::DataProcessor).await;
        store
            .insert_metric(NewMetricSample::new(ServiceName::DataProcessor, "cpu", 3.0, t0()))
            .await
            .unwrap();
        let alert = store
            .insert_alert(
                NewAlert::new("data_processor is down", "", Severity::Critical, t0())
                    .for_service(ServiceName::DataProcessor),
            )
            .await
            .unwrap();

        assert!(store.delete_service(ServiceName::DataProcessor).await.unwrap());
        assert!(!store.delete_service(ServiceName::DataProcessor).await.unwrap());

        assert!(store.query_metrics(&MetricFilter::default()).await.unwrap().is_empty());
        let kept = store.get_alert(alert.id).await.unwrap().unwrap();
        assert_eq!(kept.service, None);
        assert_eq!(kept.title, "data_processor is down");
    }

    #[tokio::test]
    async fn test_pipeline_runs_round_trip_metadata() {
        let store = open().await;
        let mut metadata = HashMap::new();
        metadata.insert("epochs".to_string(), serde_json::json!(10));

        let mut run = store
            .insert_pipeline_run(
                NewPipelineRun::started(PipelineType::Training, PipelineStatus::Running, t0())
                    .with_metadata(metadata),
            )
            .await
            .unwrap();
        store
            .insert_pipeline_run(NewPipelineRun::started(
                PipelineType::Evaluation,
                PipelineStatus::Pending,
                hours(1),
            ))
            .await
            .unwrap();

        run.status = PipelineStatus::Failed;
        run.end_time = Some(hours(2));
        run.error_message = Some("CUDA out of memory".to_string());
        store.update_pipeline_run(&run).await.unwrap();

        let stored = store.get_pipeline_run(run.id).await.unwrap().unwrap();
        assert_eq!(stored, run);
        assert_eq!(stored.metadata["epochs"], 10);

        let failed = store
            .query_pipeline_runs(&PipelineFilter::with_status(PipelineStatus::Failed))
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);

        let all = store.query_pipeline_runs(&PipelineFilter::default()).await.unwrap();
        assert_eq!(all[0].pipeline_type, PipelineType::Evaluation);
        assert!(store.get_pipeline_run(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_alert_acknowledge_and_filters() {
        let store = open().await;
        register(&store, ServiceName::Database).await;

        let mut first = store
            .insert_alert(
                NewAlert::new("database is down", "refused", Severity::Critical, t0())
                    .for_service(ServiceName::Database),
            )
            .await
            .unwrap();
        store
            .insert_alert(NewAlert::new("Disk almost full", "92%", Severity::High, hours(1)))
            .await
            .unwrap();

        assert!(first.acknowledge("alice", hours(2)));
        store.update_alert(&first).await.unwrap();

        let stored = store.get_alert(first.id).await.unwrap().unwrap();
        assert!(stored.acknowledged);
        assert_eq!(stored.acknowledged_by.as_deref(), Some("alice"));
        assert_eq!(stored.acknowledged_at, Some(hours(2)));

        let open_alerts = store
            .query_alerts(&AlertFilter {
                acknowledged: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(open_alerts.len(), 1);
        assert_eq!(open_alerts[0].title, "Disk almost full");

        assert!(store
            .has_alert(&AlertFilter::for_service(ServiceName::Database).with_title("database is down"))
            .await
            .unwrap());
        assert!(!store
            .has_alert(&AlertFilter::for_service(ServiceName::Database).with_title("database recovered"))
            .await
            .unwrap());

        let empty_title = store
            .insert_alert(NewAlert::new("  ", "", Severity::Low, t0()))
            .await;
        assert!(matches!(empty_title, Err(MonitorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = open().await;
        assert!(store.health_check().await.is_ok());
    }
}
