//! Pipeline monitor integration tests

#[cfg(test)]
mod tests {
    use crate::common::{TestMonitor, hours, t0};
    use chrono::Duration;
    use fleet_monitor::core::models::{PipelineStatus, PipelineType, Severity};
    use fleet_monitor::monitoring::PipelineUpdate;
    use fleet_monitor::monitoring::pipeline::{FAILURE_ALERT_TITLE, STUCK_ALERT_TITLE};

    #[tokio::test]
    async fn test_failed_run_alerts_once_across_sweeps() {
        let monitor = TestMonitor::new();
        let pipelines = monitor.system.pipelines();

        let started = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Training, PipelineStatus::Running),
                t0(),
            )
            .await
            .unwrap();
        let failed_at = t0() + Duration::minutes(30);
        let run = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Training, PipelineStatus::Failed)
                    .with_error("CUDA out of memory"),
                failed_at,
            )
            .await
            .unwrap();
        assert_eq!(run.id, started.id);
        assert_eq!(run.end_time, Some(failed_at));

        let first = pipelines.sweep_at(failed_at + Duration::minutes(1)).await.unwrap();
        let second = pipelines.sweep_at(failed_at + Duration::minutes(2)).await.unwrap();
        assert_eq!(first.failure_alerts, 1);
        assert_eq!(second.failure_alerts, 0);

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, FAILURE_ALERT_TITLE);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].pipeline_run, Some(run.id));
        assert!(alerts[0].message.contains("CUDA out of memory"));
    }

    #[tokio::test]
    async fn test_stuck_run_alerts_once_per_run() {
        let monitor = TestMonitor::new();
        let pipelines = monitor.system.pipelines();

        let ingest = pipelines
            .report(
                PipelineUpdate::new(PipelineType::DataIngestion, PipelineStatus::Running),
                t0(),
            )
            .await
            .unwrap();
        // Pending runs are never stuck
        pipelines
            .report(
                PipelineUpdate::new(PipelineType::Evaluation, PipelineStatus::Pending),
                t0(),
            )
            .await
            .unwrap();

        assert_eq!(pipelines.sweep_at(t0() + Duration::minutes(30)).await.unwrap().stuck_alerts, 0);
        assert_eq!(pipelines.sweep_at(hours(2)).await.unwrap().stuck_alerts, 1);
        assert_eq!(pipelines.sweep_at(hours(3)).await.unwrap().stuck_alerts, 0);

        let alerts = monitor.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, STUCK_ALERT_TITLE);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].pipeline_run, Some(ingest.id));

        // Finishing the run clears it from the stuck set
        pipelines
            .report(
                PipelineUpdate::new(PipelineType::DataIngestion, PipelineStatus::Success)
                    .for_run(ingest.id),
                hours(4),
            )
            .await
            .unwrap();
        let report = pipelines.sweep_at(hours(5)).await.unwrap();
        assert_eq!(report.stuck_alerts + report.failure_alerts, 0);
    }

    #[tokio::test]
    async fn test_new_run_after_terminal_one() {
        let monitor = TestMonitor::new();
        let pipelines = monitor.system.pipelines();

        let first = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Inference, PipelineStatus::Success),
                t0(),
            )
            .await
            .unwrap();
        assert!(first.end_time.is_some());

        let second = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Inference, PipelineStatus::Running),
                hours(1),
            )
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let conflict = pipelines
            .report(
                PipelineUpdate::new(PipelineType::Inference, PipelineStatus::Failed)
                    .for_run(first.id),
                hours(2),
            )
            .await;
        assert!(matches!(
            conflict,
            Err(fleet_monitor::MonitorError::Conflict(_))
        ));
    }
}
