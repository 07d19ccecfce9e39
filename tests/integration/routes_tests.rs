//! HTTP surface tests through actix test services

#[cfg(test)]
mod tests {
    use crate::common::TestMonitor;
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use fleet_monitor::Config;
    use fleet_monitor::server::{AppState, HttpServer};
    use serde_json::{Value, json};

    macro_rules! app {
        ($monitor:expr) => {
            test::init_service(HttpServer::create_app(web::Data::new(AppState::new(
                Config::default(),
                $monitor.system.clone(),
            ))))
            .await
        };
    }

    macro_rules! call {
        ($app:expr, $request:expr $(,)?) => {
            test::call_service(&$app, $request.to_request())
        };
    }

    fn post(uri: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post().uri(uri).set_json(body)
    }

    fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get().uri(uri)
    }

    #[actix_web::test]
    async fn test_service_push_and_list() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        let resp = call!(
            app,
            post(
                "/services/",
                json!({"name": "data_fetcher", "status": "up", "endpoint": "http://fetcher:8080/health"}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "up");
        assert_eq!(body["data"]["endpoint"], "http://fetcher:8080/health");

        let resp = call!(app, get("/services")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);
        assert_eq!(body["data"][0]["name"], "data_fetcher");
    }

    #[actix_web::test]
    async fn test_service_push_validation() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        let resp =
            call!(app, post("/services/", json!({"name": "mainframe", "status": "up"})))
                .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let resp = call!(
            app,
            post(
                "/services/",
                json!({"name": "dashboard", "status": "up", "endpoint": "not a url"}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = call!(
            app,
            post("/services/", json!({"name": "dashboard", "status": "sideways"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // Nothing was registered by the rejected pushes
        assert!(monitor.system.services().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_metric_ingest_and_query() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        let sample = json!({"service": "ml_service", "metric_type": "cpu", "value": 41.5});
        let resp = call!(app, post("/metrics/", sample.clone())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = call!(
            app,
            post("/services/", json!({"name": "ml_service", "status": "unknown"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = call!(app, post("/metrics/", sample)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = call!(
            app,
            post(
                "/metrics/",
                json!({
                    "service": "ml_service",
                    "metric_type": "memory",
                    "value": 70.0,
                    "timestamp": "2020-01-01T00:00:00Z"
                }),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp =
            call!(app, get("/metrics/?service=ml_service&metric_type=cpu")).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);
        assert_eq!(body["data"][0]["value"], 41.5);

        // The old sample is outside the default 24 hour window
        let resp = call!(app, get("/metrics/?service=ml_service")).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);

        let resp = call!(app, get("/metrics/?hours=0")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = call!(app, get("/metrics/?hours=10000000000000")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_pipeline_report_and_query() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        let resp = call!(
            app,
            post(
                "/pipelines/",
                json!({"pipeline_type": "training", "status": "running", "metadata": {"epochs": 10}}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let run_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["metadata"]["epochs"], 10);

        let resp = call!(
            app,
            post(
                "/pipelines/",
                json!({"pipeline_type": "training", "status": "completed"}),
            ),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["id"], run_id);
        assert_eq!(body["data"]["status"], "success");

        let resp = call!(
            app,
            post(
                "/pipelines/",
                json!({"run_id": run_id, "pipeline_type": "training", "status": "failed"}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = call!(app, get("/pipelines/?type=training&status=success")).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);

        let resp = call!(app, get("/pipelines/?type=compiling")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_alert_create_list_and_acknowledge() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        let resp = call!(
            app,
            post(
                "/alerts/",
                json!({"title": "Disk almost full", "message": "92% used", "severity": 3}),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let alert_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["acknowledged"], false);

        let resp = call!(app, get("/alerts/?acknowledged=false&severity=high")).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);

        let resp = call!(
            app,
            post("/alerts/", json!({"alert_id": alert_id, "user": "alice"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["acknowledged"], true);
        assert_eq!(body["data"]["acknowledged_by"], "alice");

        let resp = call!(
            app,
            post("/alerts/", json!({"alert_id": alert_id, "user": "bob"})),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["acknowledged_by"], "alice");

        let resp = call!(app, get("/alerts/?acknowledged=true")).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["count"], 1);

        let resp = call!(
            app,
            post("/alerts/", json!({"alert_id": 9999, "user": "alice"})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        monitor.system.alerts().flush().await;
        assert_eq!(monitor.channel.delivered().len(), 1);
    }

    #[actix_web::test]
    async fn test_health_and_service_removal() {
        let monitor = TestMonitor::new();
        let app = app!(monitor);

        call!(
            app,
            post("/services/", json!({"name": "database", "status": "down"})),
        )
        .await;

        let resp = call!(app, get("/health")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["services"]["total"], 1);
        assert_eq!(body["data"]["services"]["down"], 1);
        assert_eq!(body["data"]["alerts"]["recorded"], 1);

        let delete = || test::TestRequest::delete().uri("/services/database");
        let resp = call!(app, delete()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = call!(app, delete()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
