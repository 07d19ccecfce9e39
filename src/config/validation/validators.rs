//! Configuration validators
//!
//! Validation implementations for every section of the monitor configuration.

use super::trait_def::Validate;
use crate::config::models::*;
use crate::utils::is_valid_url;
use std::collections::HashSet;
use tracing::debug;

impl Validate for MonitorConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating monitor configuration");

        self.server.validate()?;
        self.storage.validate()?;
        self.health.validate()?;
        self.escalation.validate()?;
        self.pipelines.validate()?;
        self.retention.validate()?;
        self.alerting.validate()?;

        // Check for duplicate service names
        let mut names = HashSet::new();
        for service in &self.services {
            if !names.insert(service.name) {
                return Err(format!("Duplicate service name: {}", service.name));
            }
            service.validate()?;
        }

        debug!("Monitor configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        self.database.validate()
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let supported = ["sqlite:", "postgres://", "postgresql://"];
        if !supported.iter().any(|prefix| self.url.starts_with(prefix)) {
            return Err("Only SQLite and PostgreSQL databases are supported".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Database connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Upper bound on a single health probe
const MAX_PROBE_TIMEOUT_SECS: u64 = 5;

impl Validate for HealthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.check_interval_secs == 0 {
            return Err("Health check interval must be greater than 0".to_string());
        }

        if self.probe_timeout_secs == 0 {
            return Err("Probe timeout must be greater than 0".to_string());
        }

        if self.probe_timeout_secs > MAX_PROBE_TIMEOUT_SECS {
            return Err(format!(
                "Probe timeout must be at most {} seconds",
                MAX_PROBE_TIMEOUT_SECS
            ));
        }

        if self.probe_timeout_secs >= self.check_interval_secs {
            return Err("Probe timeout must be shorter than the health check interval".to_string());
        }

        if self.freshness_window_secs == 0 {
            return Err("Freshness window must be greater than 0".to_string());
        }

        if self.max_concurrent_probes == 0 {
            return Err("Max concurrent probes must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for EscalationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tiers.is_empty() {
            return Err("At least one escalation tier must be configured".to_string());
        }

        let mut previous = 0;
        for tier in &self.tiers {
            if tier.after_secs == 0 {
                return Err("Escalation tier duration must be greater than 0".to_string());
            }
            if tier.after_secs <= previous {
                return Err(format!(
                    "Escalation tiers must be strictly ascending (tier {} follows {})",
                    tier.label(),
                    EscalationTier::new(previous, tier.severity).label()
                ));
            }
            previous = tier.after_secs;
        }

        Ok(())
    }
}

impl Validate for PipelineMonitorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("Pipeline sweep interval must be greater than 0".to_string());
        }

        if self.stuck_threshold_secs == 0 {
            return Err("Pipeline stuck threshold must be greater than 0".to_string());
        }

        if self.failure_window_secs == 0 {
            return Err("Pipeline failure window must be greater than 0".to_string());
        }

        // Every failure must be seen by at least one sweep
        if self.failure_window_secs < self.sweep_interval_secs {
            return Err(
                "Pipeline failure window must not be shorter than the sweep interval".to_string(),
            );
        }

        Ok(())
    }
}

impl Validate for RetentionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_age_days == 0 {
            return Err("Metric retention must be at least one day".to_string());
        }

        if self.cleanup_interval_secs == 0 {
            return Err("Retention cleanup interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for AlertingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.channel_timeout_secs == 0 {
            return Err("Channel timeout must be greater than 0".to_string());
        }

        if let Some(telegram) = &self.telegram {
            if telegram.bot_token.is_empty() || telegram.chat_id.is_empty() {
                return Err("Telegram bot token and chat id are both required".to_string());
            }
            if !is_valid_url(&telegram.api_base) {
                return Err(format!("Invalid Telegram API base: {}", telegram.api_base));
            }
        }

        if let Some(slack) = &self.slack {
            if !is_valid_url(&slack.webhook_url) {
                return Err("Invalid Slack webhook URL".to_string());
            }
        }

        let mut names = HashSet::new();
        for webhook in &self.webhooks {
            if webhook.name.is_empty() {
                return Err("Webhook name cannot be empty".to_string());
            }
            if !names.insert(webhook.name.as_str()) {
                return Err(format!("Duplicate webhook name: {}", webhook.name));
            }
            if !is_valid_url(&webhook.url) {
                return Err(format!("Invalid URL for webhook {}", webhook.name));
            }
        }

        Ok(())
    }
}

impl Validate for ServiceEntry {
    fn validate(&self) -> Result<(), String> {
        match &self.endpoint {
            Some(endpoint) if !is_valid_url(endpoint) => Err(format!(
                "Invalid endpoint for service {}: {}",
                self.name, endpoint
            )),
            _ => Ok(()),
        }
    }
}
