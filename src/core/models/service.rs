//! Monitored service model

use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known service roles in the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    DataFetcher,
    DataProcessor,
    DataPipeline,
    MlService,
    ModelTrainer,
    ApiGateway,
    Database,
    Dashboard,
}

impl ServiceName {
    /// Every known service role
    pub const ALL: [ServiceName; 8] = [
        ServiceName::DataFetcher,
        ServiceName::DataProcessor,
        ServiceName::DataPipeline,
        ServiceName::MlService,
        ServiceName::ModelTrainer,
        ServiceName::ApiGateway,
        ServiceName::Database,
        ServiceName::Dashboard,
    ];

    /// Wire name of the service
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::DataFetcher => "data_fetcher",
            ServiceName::DataProcessor => "data_processor",
            ServiceName::DataPipeline => "data_pipeline",
            ServiceName::MlService => "ml_service",
            ServiceName::ModelTrainer => "model_trainer",
            ServiceName::ApiGateway => "api_gateway",
            ServiceName::Database => "database",
            ServiceName::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceName {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        ServiceName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MonitorError::validation(format!("Unknown service name: {}", s)))
    }
}

/// Canonical status of a monitored service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Up => "up",
            ServiceStatus::Down => "down",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(ServiceStatus::Unknown),
            "up" => Ok(ServiceStatus::Up),
            "down" => Ok(ServiceStatus::Down),
            other => Err(MonitorError::validation(format!(
                "Invalid service status: {}",
                other
            ))),
        }
    }
}

/// A registered service and its current health
///
/// Only the status state machine mutates `status`, `last_check` and
/// `last_status_change`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredService {
    /// Service name (unique)
    pub name: ServiceName,
    /// Current status
    pub status: ServiceStatus,
    /// Health endpoint probed by the scheduler
    pub endpoint: Option<String>,
    /// Time of the latest observation
    pub last_check: Option<DateTime<Utc>>,
    /// Time of the latest status flip
    pub last_status_change: Option<DateTime<Utc>>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl MonitoredService {
    /// Create a freshly registered service in the `unknown` state
    pub fn new(name: ServiceName, endpoint: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            name,
            status: ServiceStatus::Unknown,
            endpoint,
            last_check: None,
            last_status_change: None,
            created_at: now,
        }
    }

    /// Whether the scheduler can pull status from this service
    pub fn is_probeable(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.is_empty())
    }
}
