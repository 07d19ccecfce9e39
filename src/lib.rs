//! # fleet-monitor
//!
//! Health monitoring, alert escalation and telemetry for a fleet of internal
//! services and ML pipelines.
//!
//! ## Features
//!
//! - **Status state machine**: `up`/`down`/`unknown` per service, driven by
//!   active probes, pushed status and freshness checks
//! - **Escalation**: tiered alerts for long outages, one per tier per episode
//! - **Pipeline monitoring**: stuck and failed run detection with idempotent alerts
//! - **Alert sink**: persisted alerts forwarded best-effort to Telegram, Slack
//!   and generic webhooks
//! - **Telemetry client**: status, resource metrics, pipeline progress and
//!   alerts pushed with bounded retry
//!
//! ## Running the monitor
//!
//! ```rust,no_run
//! use fleet_monitor::server::builder::run_server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     run_server("config/monitor.yaml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Reporting from a service
//!
//! ```rust,no_run
//! use fleet_monitor::client::{ClientConfig, TelemetryClient};
//! use fleet_monitor::core::models::{ServiceName, ServiceStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::new(ClientConfig::new(
//!         "http://monitor:8000",
//!         ServiceName::DataFetcher,
//!     ))?;
//!     client.update_status(ServiceStatus::Up, Some("http://fetcher:8080/health")).await?;
//!     client.send_metrics(&[("rows_fetched".to_string(), 1200.0)]).await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod client;
pub mod config;
pub mod core;
pub mod monitoring;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use monitoring::{BackgroundTasks, MonitoringSystem};
pub use utils::error::{MonitorError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata stamped by `build.rs`
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Seconds since the epoch at build time
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
