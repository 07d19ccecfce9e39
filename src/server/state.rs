//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::monitoring::MonitoringSystem;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Both fields are cheap to clone; the monitoring system shares its
/// evaluators behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Monitor configuration (shared read-only)
    pub config: Arc<Config>,
    /// Evaluators, store and alert sink
    pub monitor: MonitoringSystem,
}

impl AppState {
    pub fn new(config: Config, monitor: MonitoringSystem) -> Self {
        Self {
            config: Arc::new(config),
            monitor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
