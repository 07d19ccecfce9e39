//! Configuration management for the monitor
//!
//! This module handles loading, validation, and management of all monitor configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{MonitorError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Main configuration struct for the monitor
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Monitor configuration
    pub monitor: MonitorConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MonitorError::Config(format!("Failed to read config file: {}", e)))?;

        let monitor: MonitorConfig = serde_yaml::from_str(&content)
            .map_err(|e| MonitorError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { monitor };

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let monitor = MonitorConfig::from_env()?;
        let config = Self { monitor };

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, then overlay environment variables
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::from_file(path).await?
        } else {
            warn!("Config file {:?} not found, using defaults", path);
            Self::default()
        };

        config.monitor.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.monitor.server
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.monitor.storage
    }

    /// Get health check configuration
    pub fn health(&self) -> &HealthConfig {
        &self.monitor.health
    }

    /// Get escalation configuration
    pub fn escalation(&self) -> &EscalationConfig {
        &self.monitor.escalation
    }

    /// Get pipeline monitor configuration
    pub fn pipelines(&self) -> &PipelineMonitorConfig {
        &self.monitor.pipelines
    }

    /// Get retention configuration
    pub fn retention(&self) -> &RetentionConfig {
        &self.monitor.retention
    }

    /// Get alerting configuration
    pub fn alerting(&self) -> &AlertingConfig {
        &self.monitor.alerting
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        Validate::validate(&self.monitor).map_err(MonitorError::Config)?;

        if self.monitor.server.cors.enabled && self.monitor.server.cors.allows_all_origins() {
            warn!("CORS allows all origins. This may be insecure for production.");
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        self.monitor = self.monitor.merge(other.monitor);
        self
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.monitor)
            .map_err(|e| MonitorError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
