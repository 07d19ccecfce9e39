//! Alert model and severity levels

use super::service::ServiceName;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered alert severity
///
/// Serialized as its numeric level so API callers can send `"severity": 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SeverityRepr", into = "u8")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Severity {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Severity::Low),
            2 => Some(Severity::Medium),
            3 => Some(Severity::High),
            4 => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl FromStr for Severity {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(level) = s.parse::<u8>() {
            return Severity::from_level(level)
                .ok_or_else(|| MonitorError::validation(format!("Invalid severity level: {}", s)));
        }
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(MonitorError::validation(format!("Invalid severity: {}", s))),
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Level(u8),
    Name(String),
}

impl TryFrom<SeverityRepr> for Severity {
    type Error = String;

    fn try_from(repr: SeverityRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            SeverityRepr::Level(level) => {
                Severity::from_level(level).ok_or_else(|| format!("invalid severity level {}", level))
            }
            SeverityRepr::Name(name) => name.parse().map_err(|e: MonitorError| e.to_string()),
        }
    }
}

/// A recorded alert
///
/// Once acknowledged, `acknowledged_by` and `acknowledged_at` are both set and
/// the alert stays acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub service: Option<ServiceName>,
    pub pipeline_run: Option<i64>,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Mark the alert acknowledged
    ///
    /// Returns `false` when it was already acknowledged; the first
    /// acknowledger is kept.
    pub fn acknowledge(&mut self, user: &str, now: DateTime<Utc>) -> bool {
        if self.acknowledged {
            return false;
        }
        self.acknowledged = true;
        self.acknowledged_by = Some(user.to_string());
        self.acknowledged_at = Some(now);
        true
    }

    /// Text sent to notification channels
    pub fn notification_text(&self) -> String {
        format!("[{}] {}\n\n{}", self.severity, self.title, self.message)
    }
}

/// An alert that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub service: Option<ServiceName>,
    pub pipeline_run: Option<i64>,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl NewAlert {
    /// A system-level alert with no back-reference
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            service: None,
            pipeline_run: None,
            title: title.into(),
            message: message.into(),
            severity,
            timestamp,
        }
    }

    pub fn for_service(mut self, service: ServiceName) -> Self {
        self.service = Some(service);
        self
    }

    pub fn for_pipeline_run(mut self, run_id: i64) -> Self {
        self.pipeline_run = Some(run_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MonitorError::validation("alert title cannot be empty"));
        }
        if self.title.len() > 200 {
            return Err(MonitorError::validation(
                "alert title cannot exceed 200 characters",
            ));
        }
        Ok(())
    }

    pub fn into_alert(self, id: i64) -> Alert {
        Alert {
            id,
            service: self.service,
            pipeline_run: self.pipeline_run,
            title: self.title,
            message: self.message,
            severity: self.severity,
            timestamp: self.timestamp,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }
}

/// Query over recorded alerts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub acknowledged: Option<bool>,
    pub severity: Option<Severity>,
    pub service: Option<ServiceName>,
    pub pipeline_run: Option<i64>,
    pub title: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl AlertFilter {
    pub fn for_pipeline_run(run_id: i64) -> Self {
        Self {
            pipeline_run: Some(run_id),
            ..Default::default()
        }
    }

    pub fn for_service(service: ServiceName) -> Self {
        Self {
            service: Some(service),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.acknowledged.is_none_or(|a| a == alert.acknowledged)
            && self.severity.is_none_or(|s| s == alert.severity)
            && self.service.is_none_or(|s| alert.service == Some(s))
            && self.pipeline_run.is_none_or(|r| alert.pipeline_run == Some(r))
            && self.title.as_deref().is_none_or(|t| t == alert.title)
            && self.since.is_none_or(|since| alert.timestamp >= since)
    }
}
