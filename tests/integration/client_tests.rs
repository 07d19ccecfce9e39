//! Telemetry client tests against a mock monitor

#[cfg(test)]
mod tests {
    use fleet_monitor::client::{CLIENT_ERROR_TITLE, ClientConfig, ClientError, TelemetryClient};
    use fleet_monitor::core::models::ServiceName;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn accepted() -> ResponseTemplate {
        ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"id": 1}
        }))
    }

    fn client(server: &MockServer) -> TelemetryClient {
        TelemetryClient::new(ClientConfig::new(server.uri(), ServiceName::DataProcessor)).unwrap()
    }

    #[tokio::test]
    async fn test_send_metrics_retries_transient_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/metrics/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/metrics/"))
            .respond_with(accepted())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/alerts/"))
            .respond_with(accepted())
            .expect(0)
            .mount(&server)
            .await;

        let custom = vec![("batches".to_string(), 4.0)];
        let started = Instant::now();
        let sent = client(&server).send_metrics(&custom).await.unwrap();
        let elapsed = started.elapsed();

        assert!(sent >= 1);
        // 0.5s before the second attempt, 1s before the third
        assert!(
            elapsed >= Duration::from_millis(1500),
            "backoff too short: {:?}",
            elapsed
        );

        let requests = server.received_requests().await.unwrap();
        let metric_posts = requests
            .iter()
            .filter(|request| request.url.path() == "/metrics/")
            .count();
        assert_eq!(metric_posts, sent + 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/metrics/"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such service"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/alerts/"))
            .and(body_partial_json(json!({
                "title": CLIENT_ERROR_TITLE,
                "service": "data_processor"
            })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        let started = Instant::now();
        let error = client(&server)
            .send_metrics(&[("batches".to_string(), 4.0)])
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_millis(500));
        match error {
            ClientError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such service");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_self_report_is_suppressed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let error = client(&server)
            .send_alert("Disk almost full", "92% used on /data", fleet_monitor::core::models::Severity::High)
            .await
            .unwrap_err();
        // The original failure is returned, not the self-report's
        assert_eq!(error.status(), Some(400));
        assert!(!error.is_retryable());

        // Original call plus one self-report, neither retried
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_monitor_is_retried_then_reported() {
        let config = ClientConfig::new("http://127.0.0.1:9", ServiceName::DataProcessor)
            .with_retry(fleet_monitor::utils::net::RetryConfig {
                initial_delay: Duration::from_millis(10),
                ..Default::default()
            });
        let error = TelemetryClient::new(config)
            .unwrap()
            .update_status(fleet_monitor::core::models::ServiceStatus::Up, None)
            .await
            .unwrap_err();
        assert!(matches!(error, ClientError::Http(_)));
    }
}
