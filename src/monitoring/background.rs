//! Background task implementations for MonitoringSystem

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::system::MonitoringSystem;

/// Handles to the running evaluators
///
/// Dropping this without calling [`BackgroundTasks::shutdown`] leaves the
/// evaluators running until the runtime stops.
#[derive(Debug)]
pub struct BackgroundTasks {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Stop accepting ticks and wait for in-flight sweeps to finish
    pub async fn shutdown(self) {
        info!("Stopping background evaluators");
        let _ = self.shutdown.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Background task panicked: {}", e);
            }
        }
        info!("Background evaluators stopped");
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl MonitoringSystem {
    /// Start the health, pipeline and retention evaluators
    pub fn start(&self) -> BackgroundTasks {
        info!("Starting monitoring system");
        let (shutdown, rx) = watch::channel(false);

        let system = self.clone();
        let health = spawn_periodic(
            "health_sweep",
            self.config.health.check_interval(),
            rx.clone(),
            move || {
                let system = system.clone();
                async move {
                    if let Err(e) = system.health.sweep().await {
                        warn!("Health sweep failed: {}", e);
                    }
                }
            },
        );

        let system = self.clone();
        let pipelines = spawn_periodic(
            "pipeline_sweep",
            self.config.pipelines.sweep_interval(),
            rx.clone(),
            move || {
                let system = system.clone();
                async move {
                    match system.pipelines.sweep().await {
                        Ok(report) if report.stuck_alerts + report.failure_alerts > 0 => {
                            info!(
                                stuck = report.stuck_alerts,
                                failed = report.failure_alerts,
                                "pipeline sweep raised alerts"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Pipeline sweep failed: {}", e),
                    }
                }
            },
        );

        let system = self.clone();
        let retention = spawn_periodic(
            "retention_sweep",
            self.config.retention.cleanup_interval(),
            rx,
            move || {
                let system = system.clone();
                async move {
                    if let Err(e) = system.retention.sweep().await {
                        warn!("Metric retention sweep failed: {}", e);
                    }
                }
            },
        );

        BackgroundTasks {
            shutdown,
            handles: vec![health, pipelines, retention],
        }
    }

    /// Stop the evaluators and drain pending alert forwarding
    pub async fn shutdown(&self, tasks: BackgroundTasks) {
        tasks.shutdown().await;
        self.sink.flush().await;
        info!("Monitoring system stopped");
    }
}

/// Run `tick` every `period` until the shutdown flag flips
///
/// A tick in progress is never interrupted; shutdown is observed between ticks.
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(10)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!(task = name, "background task stopped");
    })
}
