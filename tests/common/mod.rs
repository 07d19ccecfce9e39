//! Common test utilities for fleet-monitor
//!
//! - Fixtures wiring a [`MonitoringSystem`](fleet_monitor::MonitoringSystem)
//!   over the in-memory store
//! - Scripted probes and recording channels
//! - A store that can be switched into an outage

pub mod fixtures;
pub mod probes;
pub mod stores;

pub use fixtures::{FETCHER_ENDPOINT, TestMonitor, fetcher_config, hours, t0};
pub use probes::{RecordingChannel, ScriptedProbe};
pub use stores::OutageStore;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
