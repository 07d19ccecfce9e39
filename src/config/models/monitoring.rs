//! Evaluator configuration: health checks, escalation, pipelines and retention

use super::*;
use crate::core::models::Severity;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health check scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Seconds between health sweeps
    #[serde(default = "default_health_check_interval")]
    pub check_interval_secs: u64,
    /// Hard per-probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// A service with no observation for this long is treated as down
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,
    /// Upper bound on probes in flight during one sweep
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_health_check_interval(),
            probe_timeout_secs: default_probe_timeout(),
            freshness_window_secs: default_freshness_window(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

impl HealthConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.check_interval_secs != default_health_check_interval() {
            self.check_interval_secs = other.check_interval_secs;
        }
        if other.probe_timeout_secs != default_probe_timeout() {
            self.probe_timeout_secs = other.probe_timeout_secs;
        }
        if other.freshness_window_secs != default_freshness_window() {
            self.freshness_window_secs = other.freshness_window_secs;
        }
        if other.max_concurrent_probes != default_max_concurrent_probes() {
            self.max_concurrent_probes = other.max_concurrent_probes;
        }
        self
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.freshness_window_secs as i64)
    }
}

/// One escalation tier: how long an episode must last and what it alerts at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTier {
    pub after_secs: u64,
    pub severity: Severity,
}

impl EscalationTier {
    pub fn new(after_secs: u64, severity: Severity) -> Self {
        Self {
            after_secs,
            severity,
        }
    }

    pub fn threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.after_secs as i64)
    }

    /// Human label used in alert titles, e.g. `6h` or `1d`
    pub fn label(&self) -> String {
        const DAY: u64 = 86_400;
        const HOUR: u64 = 3_600;
        const MINUTE: u64 = 60;
        match self.after_secs {
            s if s >= DAY && s % DAY == 0 => format!("{}d", s / DAY),
            s if s >= HOUR && s % HOUR == 0 => format!("{}h", s / HOUR),
            s if s >= MINUTE && s % MINUTE == 0 => format!("{}m", s / MINUTE),
            s => format!("{}s", s),
        }
    }

    /// Spelled-out duration, e.g. `6 hours` or `1 day`
    pub fn describe(&self) -> String {
        fn plural(n: u64, unit: &str) -> String {
            if n == 1 {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", n, unit)
            }
        }

        match self.after_secs {
            s if s >= 86_400 && s % 86_400 == 0 => plural(s / 86_400, "day"),
            s if s >= 3_600 && s % 3_600 == 0 => plural(s / 3_600, "hour"),
            s if s >= 60 && s % 60 == 0 => plural(s / 60, "minute"),
            s => plural(s, "second"),
        }
    }
}

pub fn default_escalation_tiers() -> Vec<EscalationTier> {
    vec![
        EscalationTier::new(3_600, Severity::Medium),
        EscalationTier::new(6 * 3_600, Severity::Medium),
        EscalationTier::new(12 * 3_600, Severity::High),
        EscalationTier::new(86_400, Severity::Critical),
    ]
}

pub fn default_down_severity() -> Severity {
    Severity::Critical
}

pub fn default_recovery_severity() -> Severity {
    Severity::Medium
}

/// Escalation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Duration tiers, ascending by `after_secs`
    #[serde(default = "default_escalation_tiers")]
    pub tiers: Vec<EscalationTier>,
    /// Severity of the alert fired on an up to down flip
    #[serde(default = "default_down_severity")]
    pub down_severity: Severity,
    /// Severity of the recovery notice
    #[serde(default = "default_recovery_severity")]
    pub recovery_severity: Severity,
    /// Whether a recovery notice is sent at all
    #[serde(default = "default_true")]
    pub send_recovery_notices: bool,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            tiers: default_escalation_tiers(),
            down_severity: default_down_severity(),
            recovery_severity: default_recovery_severity(),
            send_recovery_notices: true,
        }
    }
}

impl EscalationConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.tiers != default_escalation_tiers() {
            self.tiers = other.tiers;
        }
        if other.down_severity != default_down_severity() {
            self.down_severity = other.down_severity;
        }
        if other.recovery_severity != default_recovery_severity() {
            self.recovery_severity = other.recovery_severity;
        }
        if !other.send_recovery_notices {
            self.send_recovery_notices = false;
        }
        self
    }
}

/// Pipeline monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMonitorConfig {
    /// Seconds between pipeline sweeps
    #[serde(default = "default_pipeline_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// A run still `running` after this many seconds is stuck
    #[serde(default = "default_stuck_threshold")]
    pub stuck_threshold_secs: u64,
    /// Failed runs ending within this trailing window are reported
    #[serde(default = "default_failure_window")]
    pub failure_window_secs: u64,
}

impl Default for PipelineMonitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_pipeline_sweep_interval(),
            stuck_threshold_secs: default_stuck_threshold(),
            failure_window_secs: default_failure_window(),
        }
    }
}

impl PipelineMonitorConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.sweep_interval_secs != default_pipeline_sweep_interval() {
            self.sweep_interval_secs = other.sweep_interval_secs;
        }
        if other.stuck_threshold_secs != default_stuck_threshold() {
            self.stuck_threshold_secs = other.stuck_threshold_secs;
        }
        if other.failure_window_secs != default_failure_window() {
            self.failure_window_secs = other.failure_window_secs;
        }
        self
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn stuck_threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stuck_threshold_secs as i64)
    }

    pub fn failure_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.failure_window_secs as i64)
    }
}

/// Metric retention configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Metric samples older than this are deleted
    #[serde(default = "default_retention_days")]
    pub max_age_days: u32,
    /// Seconds between cleanup passes
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_retention_days(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl RetentionConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.max_age_days != default_retention_days() {
            self.max_age_days = other.max_age_days;
        }
        if other.cleanup_interval_secs != default_cleanup_interval() {
            self.cleanup_interval_secs = other.cleanup_interval_secs;
        }
        self
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
