//! Configuration loading tests

#[cfg(test)]
mod tests {
    use fleet_monitor::Config;
    use fleet_monitor::MonitorError;
    use fleet_monitor::core::models::{ServiceName, Severity};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_example_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/monitor.yaml.example");
        let config = Config::from_file(path).await.unwrap();

        assert_eq!(config.server().port, 8000);
        assert!(config.storage().database.enabled);
        assert_eq!(config.escalation().recovery_severity, Severity::Medium);
        assert_eq!(config.escalation().tiers.len(), 4);
        assert_eq!(config.retention().max_age_days, 30);
        assert!(!config.alerting().has_channels());

        let services: Vec<(ServiceName, bool)> = config
            .monitor
            .services
            .iter()
            .map(|s| (s.name, s.endpoint.is_some()))
            .collect();
        assert_eq!(
            services,
            vec![
                (ServiceName::DataFetcher, true),
                (ServiceName::DataProcessor, true),
                (ServiceName::MlService, true),
                (ServiceName::ModelTrainer, false),
            ]
        );
    }

    #[tokio::test]
    async fn test_tiers_must_ascend() {
        let file = write_config(
            "escalation:\n  tiers:\n    - after_secs: 7200\n      severity: medium\n    - after_secs: 3600\n      severity: high\n",
        );
        let err = Config::from_file(file.path()).await.unwrap_err();
        match err {
            MonitorError::Config(message) => assert!(message.contains("ascending")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_services_rejected() {
        let file = write_config(
            "services:\n  - name: dashboard\n  - name: dashboard\n    endpoint: http://dash:3000/health\n",
        );
        assert!(matches!(
            Config::from_file(file.path()).await,
            Err(MonitorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_endpoint_and_unknown_service_rejected() {
        let file = write_config("services:\n  - name: dashboard\n    endpoint: not-a-url\n");
        assert!(Config::from_file(file.path()).await.is_err());

        let file = write_config("services:\n  - name: billing\n");
        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_database_rejected() {
        let file = write_config("storage:\n  database:\n    enabled: true\n    url: mysql://db/fleet\n");
        assert!(Config::from_file(file.path()).await.is_err());

        // A disabled database is not checked
        let file = write_config("storage:\n  database:\n    enabled: false\n    url: mysql://db/fleet\n");
        assert!(Config::from_file(file.path()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("monitor.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }
}
