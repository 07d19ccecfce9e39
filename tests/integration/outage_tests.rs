//! Behaviour while the store is failing
//!
//! Alerts that could not be stored must still go out once the store is
//! back, and exactly once.

#[cfg(test)]
mod tests {
    use crate::common::{FETCHER_ENDPOINT, OutageStore, TestMonitor, fetcher_config, hours, t0};
    use chrono::Duration;
    use fleet_monitor::config::MonitorConfig;
    use fleet_monitor::core::models::{
        PipelineStatus, PipelineType, ServiceName, ServiceStatus, Severity,
    };
    use fleet_monitor::monitoring::PipelineUpdate;
    use fleet_monitor::monitoring::pipeline::FAILURE_ALERT_TITLE;
    use std::sync::Arc;

    fn fetcher_over(store: &Arc<OutageStore>) -> TestMonitor {
        TestMonitor::with_store(fetcher_config(), store.clone())
    }

    #[tokio::test]
    async fn test_down_alert_sent_after_alert_writes_recover() {
        let store = Arc::new(OutageStore::new());
        let monitor = fetcher_over(&store);
        let health = monitor.system.health();
        monitor.system.register_configured_services(t0()).await.unwrap();

        store.fail_alert_writes(true);
        let report = health.sweep_at(t0()).await.unwrap();
        assert_eq!(report.errors, 1);
        assert_eq!(report.alerts, 0);
        let report = health.sweep_at(hours(1)).await.unwrap();
        assert_eq!(report.errors, 1);
        assert!(monitor.alerts().await.is_empty());

        store.fail_alert_writes(false);
        let report = health.sweep_at(hours(2)).await.unwrap();
        assert_eq!(report.errors, 0);
        assert_eq!(report.alerts, 2);

        let alerts = monitor.alerts().await;
        let summary: Vec<(&str, Severity)> = alerts
            .iter()
            .map(|alert| (alert.title.as_str(), alert.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("data_fetcher is down", Severity::Critical),
                ("data_fetcher is down for more than 1 hour", Severity::Medium),
            ]
        );
        assert!(alerts[0].message.contains("down since 2026-03-02 08:00:00 UTC"));

        assert_eq!(health.sweep_at(hours(3)).await.unwrap().alerts, 0);
        assert_eq!(monitor.alerts().await.len(), 2);
        assert_eq!(store.rejected_alerts(), 2);
    }

    #[tokio::test]
    async fn test_tier_alert_retried_after_failed_write() {
        let store = Arc::new(OutageStore::new());
        let monitor = fetcher_over(&store);
        let health = monitor.system.health();
        monitor.system.register_configured_services(t0()).await.unwrap();

        health.sweep_at(t0()).await.unwrap();

        store.fail_alert_writes(true);
        assert_eq!(health.sweep_at(hours(1)).await.unwrap().errors, 1);

        store.fail_alert_writes(false);
        let report = health.sweep_at(hours(2)).await.unwrap();
        assert_eq!(report.alerts, 1);
        assert_eq!(
            monitor.alert_titles().await,
            vec![
                "data_fetcher is down",
                "data_fetcher is down for more than 1 hour",
            ]
        );

        // Later tiers are unaffected
        health.sweep_at(hours(6)).await.unwrap();
        assert_eq!(monitor.alerts().await.len(), 3);
    }

    #[tokio::test]
    async fn test_recovery_notice_survives_failed_write() {
        let store = Arc::new(OutageStore::new());
        let monitor = fetcher_over(&store);
        let health = monitor.system.health();
        monitor.system.register_configured_services(t0()).await.unwrap();
        health.sweep_at(t0()).await.unwrap();

        monitor.probe.set_healthy(FETCHER_ENDPOINT, true);
        store.fail_alert_writes(true);
        assert_eq!(health.sweep_at(hours(1)).await.unwrap().errors, 1);

        store.fail_alert_writes(false);
        let report = health.sweep_at(hours(2)).await.unwrap();
        assert_eq!(report.transitions, 1);
        assert_eq!(report.alerts, 1);
        assert_eq!(
            monitor.alert_titles().await,
            vec!["data_fetcher is down", "data_fetcher recovered"]
        );
    }

    #[tokio::test]
    async fn test_sweeps_fail_while_store_is_down() {
        let store = Arc::new(OutageStore::new());
        let monitor = TestMonitor::with_store(MonitorConfig::default(), store.clone());
        monitor
            .system
            .health()
            .report_status(ServiceName::ModelTrainer, ServiceStatus::Up, None, t0())
            .await
            .unwrap();

        store.fail_everything(true);
        assert!(monitor.system.health().sweep_at(hours(1)).await.is_err());
        assert!(monitor.system.pipelines().sweep_at(hours(1)).await.is_err());
        assert!(monitor.system.store().health_check().await.is_err());

        store.fail_everything(false);
        let report = monitor.system.health().sweep_at(hours(1)).await.unwrap();
        assert_eq!(report.transitions, 1);
        assert_eq!(monitor.alert_titles().await, vec!["model_trainer is down"]);
    }

    #[tokio::test]
    async fn test_pipeline_failure_alert_after_store_recovers() {
        let store = Arc::new(OutageStore::new());
        let monitor = TestMonitor::with_store(MonitorConfig::default(), store.clone());
        let pipelines = monitor.system.pipelines();

        let run = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Training, PipelineStatus::Failed)
                    .with_error("loss is NaN"),
                t0(),
            )
            .await
            .unwrap();

        store.fail_alert_writes(true);
        let report = pipelines.sweep_at(t0() + Duration::minutes(1)).await.unwrap();
        assert_eq!(report.failure_alerts, 0);
        assert_eq!(report.errors, 1);

        store.fail_alert_writes(false);
        let report = pipelines.sweep_at(t0() + Duration::minutes(2)).await.unwrap();
        assert_eq!(report.failure_alerts, 1);
        assert_eq!(report.errors, 0);
        let report = pipelines.sweep_at(t0() + Duration::minutes(3)).await.unwrap();
        assert_eq!(report.failure_alerts, 0);

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, FAILURE_ALERT_TITLE);
        assert_eq!(alerts[0].pipeline_run, Some(run.id));
    }
}
