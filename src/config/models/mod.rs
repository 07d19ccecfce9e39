//! Configuration data models
//!
//! This module defines all configuration structures used throughout the monitor.

#![allow(missing_docs)]

pub mod alerting;
pub mod monitor;
pub mod monitoring;
pub mod server;
pub mod storage;

// Re-export all configuration types
pub use alerting::*;
pub use monitor::*;
pub use monitoring::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

pub fn default_database_url() -> String {
    "sqlite://fleet-monitor.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_health_check_interval() -> u64 {
    60
}

pub fn default_probe_timeout() -> u64 {
    5
}

pub fn default_freshness_window() -> u64 {
    300 // 5 minutes
}

pub fn default_max_concurrent_probes() -> usize {
    16
}

pub fn default_pipeline_sweep_interval() -> u64 {
    60
}

pub fn default_stuck_threshold() -> u64 {
    3600 // 1 hour
}

pub fn default_failure_window() -> u64 {
    300 // 5 minutes
}

pub fn default_retention_days() -> u32 {
    30
}

pub fn default_cleanup_interval() -> u64 {
    86400 // daily
}

pub fn default_channel_timeout() -> u64 {
    10
}

pub fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
