//! Server builder and run_server function
//!
//! This module provides the ServerBuilder for easier server configuration
//! and the run_server function that drives the whole monitor process.

use crate::config::Config;
use crate::monitoring::MonitoringSystem;
use crate::server::server::HttpServer;
use crate::utils::error::{MonitorError, Result};
use chrono::Utc;
use std::path::Path;
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    monitor: Option<MonitoringSystem>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an already wired monitoring system
    pub fn with_monitor(mut self, monitor: MonitoringSystem) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Build the HTTP server, wiring a monitoring system from config if none was given
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| MonitorError::Config("Configuration is required".to_string()))?;

        let monitor = match self.monitor {
            Some(monitor) => monitor,
            None => MonitoringSystem::from_config(config.monitor.clone()).await?,
        };

        Ok(HttpServer::new(&config, monitor))
    }
}

/// Run the monitor: evaluators in the background, HTTP server in front
///
/// Returns after the server stops and the evaluators have finished their
/// current sweep.
pub async fn run_server<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!("Starting fleet monitor");

    let config = Config::load(config_path).await?;
    let monitor = MonitoringSystem::from_config(config.monitor.clone()).await?;
    monitor.register_configured_services(Utc::now()).await?;

    let tasks = monitor.start();
    let server = ServerBuilder::new()
        .with_config(config.clone())
        .with_monitor(monitor.clone())
        .build()
        .await?;

    info!(
        "Server starting at: http://{}:{}",
        config.server().host,
        config.server().port
    );
    info!("API Endpoints:");
    info!("   GET  /health     - Monitor liveness");
    info!("   GET  /services/  - Service status");
    info!("   POST /services/  - Push service status");
    info!("   GET  /metrics/   - Query metric samples");
    info!("   POST /metrics/   - Ingest a metric sample");
    info!("   GET  /pipelines/ - Query pipeline runs");
    info!("   POST /pipelines/ - Report pipeline status");
    info!("   GET  /alerts/    - List alerts");
    info!("   POST /alerts/    - Raise or acknowledge an alert");

    let result = server.start().await;
    monitor.shutdown(tasks).await;
    result
}
