//! Integration tests for fleet-monitor
//!
//! These drive the monitoring system, the relational store, the HTTP
//! surface and the telemetry client together, with probes and channels
//! replaced by scripted doubles.

pub mod client_tests;
pub mod config_tests;
pub mod health_tests;
pub mod outage_tests;
pub mod pipeline_tests;
pub mod routes_tests;
pub mod store_tests;
