//! Health checking
//!
//! Probes, pushed status and staleness all end up as observations fed to the
//! status state machine by the [`HealthScheduler`].

mod probe;
mod scheduler;

pub use probe::{HealthProbe, HttpProbe, ProbeOutcome};
pub use scheduler::{HealthScheduler, HealthSweepReport};
