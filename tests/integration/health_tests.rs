//! Health sweep integration tests
//!
//! Drive the scheduler through scripted timelines and check the resulting
//! statuses and alerts in the store.

#[cfg(test)]
mod tests {
    use crate::common::{FETCHER_ENDPOINT, TestMonitor, fetcher_config, hours, t0};
    use chrono::Duration;
    use fleet_monitor::core::models::{ServiceName, ServiceStatus, Severity};

    async fn fetcher_status(monitor: &TestMonitor) -> ServiceStatus {
        monitor
            .system
            .store()
            .get_service(ServiceName::DataFetcher)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    /// Hourly refused probes: one transition alert, then the 1h and 6h tiers
    #[tokio::test]
    async fn test_data_fetcher_outage_timeline() {
        let monitor = TestMonitor::with_fetcher();
        monitor.system.register_configured_services(t0()).await.unwrap();

        for tick in 0..=6 {
            let report = monitor.system.health().sweep_at(hours(tick)).await.unwrap();
            assert_eq!(report.checked, 1);
            assert_eq!(report.errors, 0);
            assert_eq!(fetcher_status(&monitor).await, ServiceStatus::Down);
        }

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
                ("data_fetcher is down for more than 6 hours", Severity::Medium),
            ]
        );
        assert_eq!(alerts[0].timestamp, t0());
        assert_eq!(alerts[2].timestamp, hours(6));
        assert!(alerts[0].message.contains(FETCHER_ENDPOINT));
        assert_eq!(monitor.probe.calls(), 7);
    }

    #[tokio::test]
    async fn test_skipped_ticks_fire_every_passed_tier_once() {
        let monitor = TestMonitor::with_fetcher();
        monitor.system.register_configured_services(t0()).await.unwrap();

        monitor.system.health().sweep_at(t0()).await.unwrap();
        let report = monitor.system.health().sweep_at(hours(13)).await.unwrap();
        assert_eq!(report.alerts, 3);

        let severities: Vec<Severity> = monitor
            .alerts()
            .await
            .into_iter()
            .skip(1)
            .map(|alert| alert.severity)
            .collect();
        assert_eq!(
            severities,
            vec![Severity::Medium, Severity::Medium, Severity::High]
        );

        let report = monitor.system.health().sweep_at(hours(14)).await.unwrap();
        assert_eq!(report.alerts, 0);
    }

    #[tokio::test]
    async fn test_recovery_starts_a_new_episode() {
        let monitor = TestMonitor::with_fetcher();
        let health = monitor.system.health();
        monitor.system.register_configured_services(t0()).await.unwrap();

        health.sweep_at(t0()).await.unwrap();
        health.sweep_at(hours(1)).await.unwrap();

        monitor.probe.set_healthy(FETCHER_ENDPOINT, true);
        health.sweep_at(hours(2)).await.unwrap();
        assert_eq!(fetcher_status(&monitor).await, ServiceStatus::Up);

        monitor.probe.set_healthy(FETCHER_ENDPOINT, false);
        health.sweep_at(hours(3)).await.unwrap();
        health.sweep_at(hours(4)).await.unwrap();

        let titles = monitor.alert_titles().await;
        assert_eq!(
            titles,
            vec![
                "data_fetcher is down",
                "data_fetcher is down for more than 1 hour",
                "data_fetcher recovered",
                "data_fetcher is down",
                "data_fetcher is down for more than 1 hour",
            ]
        );
    }

    #[tokio::test]
    async fn test_restart_does_not_refire_consumed_tiers() {
        let before = TestMonitor::with_fetcher();
        before.system.register_configured_services(t0()).await.unwrap();
        before.system.health().sweep_at(t0()).await.unwrap();
        before.system.health().sweep_at(hours(1)).await.unwrap();

        let after = TestMonitor::with_store(fetcher_config(), before.system.store().clone());
        after.system.health().sweep_at(hours(2)).await.unwrap();
        assert_eq!(after.alerts().await.len(), 2);

        after.system.health().sweep_at(hours(6)).await.unwrap();
        let titles = after.alert_titles().await;
        assert_eq!(titles.len(), 3);
        assert_eq!(titles[2], "data_fetcher is down for more than 6 hours");
    }

    #[tokio::test]
    async fn test_healthy_probe_records_response_time() {
        let monitor = TestMonitor::with_fetcher();
        monitor.probe.set_healthy(FETCHER_ENDPOINT, true);
        monitor.system.register_configured_services(t0()).await.unwrap();

        let report = monitor.system.health().sweep_at(t0()).await.unwrap();
        assert_eq!(report.transitions, 1);
        assert_eq!(fetcher_status(&monitor).await, ServiceStatus::Up);
        // Unknown to up is not a recovery
        assert!(monitor.alerts().await.is_empty());

        let samples = monitor
            .system
            .store()
            .query_metrics(
                &fleet_monitor::core::models::MetricFilter::for_service(ServiceName::DataFetcher)
                    .with_metric_type("response_time"),
            )
            .await
            .unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].value > 0.0);
    }

    #[tokio::test]
    async fn test_push_only_service_goes_stale() {
        let monitor = TestMonitor::new();
        let health = monitor.system.health();

        health
            .report_status(ServiceName::ModelTrainer, ServiceStatus::Up, None, t0())
            .await
            .unwrap();

        health
            .sweep_at(t0() + Duration::minutes(4))
            .await
            .unwrap();
        assert!(monitor.alerts().await.is_empty());

        let report = health.sweep_at(t0() + Duration::minutes(6)).await.unwrap();
        assert_eq!(report.probed, 0);
        assert_eq!(report.transitions, 1);

        let service = monitor
            .system
            .store()
            .get_service(ServiceName::ModelTrainer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(service.status, ServiceStatus::Down);
        assert_eq!(service.last_check, Some(t0()));

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("freshness window"));

        // A fresh push brings it back
        health
            .report_status(
                ServiceName::ModelTrainer,
                ServiceStatus::Up,
                None,
                t0() + Duration::minutes(7),
            )
            .await
            .unwrap();
        assert_eq!(
            monitor.alert_titles().await.last().map(String::as_str),
            Some("model_trainer recovered")
        );
    }

    #[tokio::test]
    async fn test_alerts_reach_channels() {
        let monitor = TestMonitor::with_fetcher();
        monitor.system.register_configured_services(t0()).await.unwrap();
        monitor.system.health().sweep_at(t0()).await.unwrap();
        monitor.system.alerts().flush().await;

        let delivered = monitor.channel.delivered();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].starts_with("[CRITICAL] data_fetcher is down"));

        let stats = monitor.system.alerts().stats();
        assert_eq!(stats.recorded, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.failed_deliveries, 0);
    }
}
