//! Health check scheduler
//!
//! Merges the two signal sources into one status per service: pulled probes
//! run on every sweep for services with an endpoint, pushed status updates
//! arrive through [`HealthScheduler::report_status`]. Services without an
//! endpoint rely on pushes and are marked down once they go stale.

use super::probe::{HealthProbe, ProbeOutcome};
use crate::config::HealthConfig;
use crate::core::models::{
    AlertFilter, MonitoredService, NewMetricSample, ServiceName, ServiceStatus, metric_types,
};
use crate::monitoring::alerts::AlertSink;
use crate::monitoring::escalation::{EscalationEngine, down_title};
use crate::monitoring::locks::{EntityKey, EntityLocks};
use crate::monitoring::state::{Observation, Transition, apply_observation, apply_staleness};
use crate::storage::MonitorStore;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tally of one health sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthSweepReport {
    pub checked: usize,
    pub probed: usize,
    pub transitions: usize,
    pub alerts: usize,
    pub errors: usize,
}

#[derive(Debug, Default)]
struct CheckOutcome {
    probed: bool,
    transition: bool,
    alerts: usize,
}

/// Drives probes, the state machine and escalation for every service
pub struct HealthScheduler {
    config: HealthConfig,
    store: Arc<dyn MonitorStore>,
    probe: Arc<dyn HealthProbe>,
    locks: Arc<EntityLocks>,
    escalation: Arc<EscalationEngine>,
    sink: Arc<AlertSink>,
}

impl HealthScheduler {
    pub fn new(
        config: HealthConfig,
        store: Arc<dyn MonitorStore>,
        probe: Arc<dyn HealthProbe>,
        locks: Arc<EntityLocks>,
        escalation: Arc<EscalationEngine>,
        sink: Arc<AlertSink>,
    ) -> Self {
        Self {
            config,
            store,
            probe,
            locks,
            escalation,
            sink,
        }
    }

    /// Register a service, or refresh the endpoint of a registered one
    pub async fn register(
        &self,
        name: ServiceName,
        endpoint: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<MonitoredService> {
        let _guard = self.locks.lock(EntityKey::Service(name)).await;
        let service = self.load_or_register(name, endpoint, now).await?;
        self.store.upsert_service(&service).await?;
        Ok(service)
    }

    /// Feed an observation for a registered service
    pub async fn observe(
        &self,
        name: ServiceName,
        observation: Observation,
    ) -> Result<MonitoredService> {
        let _guard = self.locks.lock(EntityKey::Service(name)).await;
        let mut service = self
            .store
            .get_service(name)
            .await?
            .ok_or_else(|| MonitorError::not_found(format!("Service {} is not registered", name)))?;

        let transition = apply_observation(&mut service, observation);
        self.commit(&service, transition).await?;
        Ok(service)
    }

    /// Handle a pushed status update
    ///
    /// The first push registers the service. `up` and `down` are fed to the
    /// state machine; `unknown` only registers and refreshes the endpoint.
    pub async fn report_status(
        &self,
        name: ServiceName,
        status: ServiceStatus,
        endpoint: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<MonitoredService> {
        let _guard = self.locks.lock(EntityKey::Service(name)).await;
        let mut service = self.load_or_register(name, endpoint, now).await?;

        let transition = match status {
            ServiceStatus::Up => apply_observation(&mut service, Observation::success(now)),
            ServiceStatus::Down => apply_observation(&mut service, Observation::failure(now)),
            ServiceStatus::Unknown => None,
        };
        self.commit(&service, transition).await?;
        Ok(service)
    }

    /// Run one sweep over all registered services at the current time
    pub async fn sweep(&self) -> Result<HealthSweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep evaluated at `now`
    ///
    /// Failing to list services fails the sweep; a failure on one service is
    /// logged and the rest still get checked.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<HealthSweepReport> {
        let services = self.store.list_services().await?;
        let concurrency = self.config.max_concurrent_probes.max(1);

        let outcomes: Vec<(ServiceName, Result<CheckOutcome>)> = stream::iter(services)
            .map(|service| async move {
                let name = service.name;
                (name, self.check_service(service, now).await)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = HealthSweepReport::default();
        for (name, outcome) in outcomes {
            report.checked += 1;
            match outcome {
                Ok(outcome) => {
                    report.probed += usize::from(outcome.probed);
                    report.transitions += usize::from(outcome.transition);
                    report.alerts += outcome.alerts;
                }
                Err(e) => {
                    report.errors += 1;
                    warn!(service = %name, "Health check failed: {}", e);
                }
            }
        }

        debug!(
            checked = report.checked,
            transitions = report.transitions,
            alerts = report.alerts,
            "health sweep finished"
        );
        Ok(report)
    }

    async fn check_service(
        &self,
        snapshot: MonitoredService,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        // The probe runs outside the entity lock so a slow endpoint never
        // delays pushes for the same service beyond the probe timeout.
        let probe_outcome = match snapshot.endpoint.as_deref() {
            Some(endpoint) if snapshot.is_probeable() => Some(self.run_probe(endpoint).await),
            _ => None,
        };

        let _guard = self.locks.lock(EntityKey::Service(snapshot.name)).await;
        let Some(mut service) = self.store.get_service(snapshot.name).await? else {
            debug!(service = %snapshot.name, "service removed during sweep");
            return Ok(CheckOutcome::default());
        };

        let mut outcome = CheckOutcome {
            probed: probe_outcome.is_some(),
            ..Default::default()
        };

        let transition = match &probe_outcome {
            Some(probe) => {
                if !probe.success {
                    debug!(
                        service = %service.name,
                        error = probe.error.as_deref().unwrap_or("unknown"),
                        "probe failed"
                    );
                }
                apply_observation(
                    &mut service,
                    Observation {
                        success: probe.success,
                        observed_at: now,
                    },
                )
            }
            None => apply_staleness(&mut service, now, self.config.freshness_window()),
        };
        outcome.transition = transition.is_some();
        outcome.alerts += self.commit(&service, transition).await?;

        if let Some(probe) = probe_outcome.filter(|p| p.success) {
            self.store
                .insert_metric(NewMetricSample::new(
                    service.name,
                    metric_types::RESPONSE_TIME,
                    probe.latency_ms(),
                    now,
                ))
                .await?;
        }

        outcome.alerts += self.escalate(&service, now).await?;
        Ok(outcome)
    }

    async fn run_probe(&self, endpoint: &str) -> ProbeOutcome {
        let timeout = self.config.probe_timeout();
        match tokio::time::timeout(timeout, self.probe.probe(endpoint)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::timed_out(timeout),
        }
    }

    /// Fire any duration tiers the current down episode has passed
    ///
    /// A tier is consumed only after its alert is stored, so a store outage
    /// delays an alert to the next sweep instead of dropping it.
    async fn escalate(&self, service: &MonitoredService, now: DateTime<Utc>) -> Result<usize> {
        let (ServiceStatus::Down, Some(started_at)) = (service.status, service.last_status_change)
        else {
            return Ok(0);
        };

        let key = EntityKey::Service(service.name);
        let mut fired = 0;
        if !self.escalation.knows_episode(key, started_at) {
            // Rebuild consumed tiers after a restart so they do not fire again
            let recorded = self
                .store
                .query_alerts(&AlertFilter {
                    since: Some(started_at),
                    ..AlertFilter::for_service(service.name)
                })
                .await?;
            let title = down_title(service);
            if !recorded.iter().any(|alert| alert.title == title) {
                warn!(service = %service.name, "down alert missing for current episode, sending it now");
                self.sink
                    .record(self.escalation.replayed_down_alert(service, now))
                    .await?;
                fired += 1;
            }
            self.escalation.restore_service_episode(
                service,
                started_at,
                recorded.iter().map(|alert| alert.title.as_str()),
            );
        }

        for (index, alert) in self.escalation.evaluate_service(service, now) {
            self.sink.record(alert).await?;
            self.escalation.consume(key, index);
            fired += 1;
        }
        Ok(fired)
    }

    async fn load_or_register(
        &self,
        name: ServiceName,
        endpoint: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<MonitoredService> {
        match self.store.get_service(name).await? {
            Some(mut service) => {
                if endpoint.is_some() {
                    service.endpoint = endpoint;
                }
                Ok(service)
            }
            None => {
                info!(service = %name, "registering service");
                Ok(MonitoredService::new(name, endpoint, now))
            }
        }
    }

    /// Persist the service and emit the transition alert, if any
    ///
    /// A failure is stored before its alert is sent; a sweep that finds the
    /// alert missing sends it late. A recovery notice is sent before the
    /// service is stored, so a failed send is retried by the next `up`.
    async fn commit(
        &self,
        service: &MonitoredService,
        transition: Option<Transition>,
    ) -> Result<usize> {
        let Some(transition) = transition else {
            self.store.upsert_service(service).await?;
            return Ok(0);
        };
        info!(
            service = %service.name,
            status = %service.status,
            at = %transition.at(),
            "service status changed"
        );

        let key = EntityKey::Service(service.name);
        let alert = self.escalation.transition_alert(service, &transition);
        match transition {
            Transition::Failed { at, .. } => {
                self.store.upsert_service(service).await?;
                let fired = match alert {
                    Some(alert) => {
                        self.sink.record(alert).await?;
                        1
                    }
                    None => 0,
                };
                self.escalation.begin_episode(key, at);
                Ok(fired)
            }
            Transition::Recovered { .. } => {
                let fired = match alert {
                    Some(alert) => {
                        self.sink.record(alert).await?;
                        1
                    }
                    None => 0,
                };
                self.store.upsert_service(service).await?;
                self.escalation.clear(key);
                Ok(fired)
            }
        }
    }
}
