//! Telemetry client
//!
//! Embedded in each monitored service (or run as the `telemetry-agent`
//! binary) to push status, resource metrics, pipeline progress and alerts
//! to the monitor's HTTP surface.

mod client;
pub mod collector;
pub mod config;
pub mod errors;
pub mod types;

pub use client::{CLIENT_ERROR_TITLE, TelemetryClient};
pub use collector::SystemCollector;
pub use config::ClientConfig;
pub use errors::{ClientError, Result};
pub use types::PipelineReport;
