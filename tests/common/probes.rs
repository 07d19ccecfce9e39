//! Test doubles for the monitor's outbound seams

use async_trait::async_trait;
use fleet_monitor::core::models::Severity;
use fleet_monitor::monitoring::{HealthProbe, NotificationChannel, ProbeOutcome};
use fleet_monitor::utils::error::{MonitorError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Probe whose answer per endpoint is set by the test
///
/// Endpoints without a scripted answer are refused.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    healthy: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_healthy(&self, endpoint: &str, healthy: bool) {
        self.healthy.lock().insert(endpoint.to_string(), healthy);
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        self.calls.lock().push(endpoint.to_string());
        let healthy = self.healthy.lock().get(endpoint).copied().unwrap_or(false);
        if healthy {
            ProbeOutcome::healthy(Duration::from_millis(12))
        } else {
            ProbeOutcome::unhealthy(Duration::from_millis(1), None, "connection refused")
        }
    }
}

/// Channel keeping every delivered text, optionally failing
#[derive(Debug)]
pub struct RecordingChannel {
    name: String,
    min_severity: Severity,
    fail: bool,
    delivered: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min_severity: Severity::Low,
            fail: false,
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn notify(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(MonitorError::notification(format!("{} is unreachable", self.name)));
        }
        self.delivered.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min_severity(&self) -> Severity {
        self.min_severity
    }
}
