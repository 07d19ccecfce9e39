//! Status state machine
//!
//! Converts raw observations from probes and pushed heartbeats into the
//! canonical status of a [`MonitoredService`]. `last_status_change` moves only
//! when the status actually flips.

use crate::core::models::{MonitoredService, ServiceStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single raw health signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub success: bool,
    pub observed_at: DateTime<Utc>,
}

impl Observation {
    pub fn success(observed_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            observed_at,
        }
    }

    pub fn failure(observed_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            observed_at,
        }
    }
}

/// A status flip emitted by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The service came up; `from_down` is false for a first observation
    Recovered { at: DateTime<Utc>, from_down: bool },
    /// The service went down, by failed observation or staleness
    Failed { at: DateTime<Utc>, stale: bool },
}

impl Transition {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Transition::Recovered { at, .. } | Transition::Failed { at, .. } => *at,
        }
    }
}

/// Apply an observation, returning the transition if the status flipped
///
/// `last_check` always advances to the observation time.
pub fn apply_observation(
    service: &mut MonitoredService,
    observation: Observation,
) -> Option<Transition> {
    let at = observation.observed_at;
    service.last_check = Some(service.last_check.map_or(at, |prev| prev.max(at)));

    let target = if observation.success {
        ServiceStatus::Up
    } else {
        ServiceStatus::Down
    };
    if service.status == target {
        return None;
    }

    let from_down = service.status == ServiceStatus::Down;
    set_status(service, target, at);
    Some(if observation.success {
        Transition::Recovered { at, from_down }
    } else {
        Transition::Failed { at, stale: false }
    })
}

/// Whether the service has gone without an observation for longer than `window`
///
/// A service that was never observed is measured from its registration.
pub fn is_stale(service: &MonitoredService, now: DateTime<Utc>, window: Duration) -> bool {
    let reference = service.last_check.unwrap_or(service.created_at);
    now - reference >= window
}

/// Treat a stale service as failed
///
/// Unlike a failed observation, staleness does not advance `last_check`.
pub fn apply_staleness(
    service: &mut MonitoredService,
    now: DateTime<Utc>,
    window: Duration,
) -> Option<Transition> {
    if service.status == ServiceStatus::Down || !is_stale(service, now, window) {
        return None;
    }

    set_status(service, ServiceStatus::Down, now);
    Some(Transition::Failed {
        at: now,
        stale: true,
    })
}

fn set_status(service: &mut MonitoredService, status: ServiceStatus, at: DateTime<Utc>) {
    service.status = status;
    // Monotonic even if observations arrive out of order
    service.last_status_change = Some(service.last_status_change.map_or(at, |prev| prev.max(at)));
}
