//! Health monitoring, escalation and alerting
//!
//! Observations flow from the health scheduler through the status state
//! machine into the escalation engine; every alert ends up in the alert sink.
//! The pipeline monitor and the retention sweeper run beside them.

// Public submodules
pub mod alerts;
pub mod escalation;
pub mod health;
pub mod locks;
pub mod pipeline;
pub mod retention;
pub mod state;

// Internal submodules
mod background;
mod system;

// Re-export public types
pub use alerts::{AlertSink, NotificationChannel, SinkStats};
pub use background::BackgroundTasks;
pub use escalation::EscalationEngine;
pub use health::{HealthProbe, HealthScheduler, HealthSweepReport, HttpProbe, ProbeOutcome};
pub use locks::{EntityKey, EntityLocks};
pub use pipeline::{PipelineMonitor, PipelineSweepReport, PipelineUpdate};
pub use retention::RetentionSweeper;
pub use state::{Observation, Transition};
pub use system::MonitoringSystem;
