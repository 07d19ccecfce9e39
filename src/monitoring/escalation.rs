//! Escalation engine
//!
//! Maps a continuous down episode onto discrete, non-repeating alerts. For
//! each entity the engine remembers which tiers already fired during the
//! current episode. An episode is identified by its start time, so a new
//! `last_status_change` starts a fresh consumed set.
//!
//! Every tier whose threshold has passed and has not been consumed fires on
//! the evaluation that notices it, in ascending order. A skipped tick
//! therefore never skips a tier, and a consumed tier never fires twice.

use super::locks::EntityKey;
use super::state::Transition;
use crate::config::{EscalationConfig, EscalationTier};
use crate::core::models::{MonitoredService, NewAlert, ServiceStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
struct Episode {
    started_at: DateTime<Utc>,
    /// Indexes into the tier table
    consumed: BTreeSet<usize>,
}

impl Episode {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            consumed: BTreeSet::new(),
        }
    }
}

/// Tiered re-alerting for long-running failures
#[derive(Debug)]
pub struct EscalationEngine {
    config: EscalationConfig,
    episodes: DashMap<EntityKey, Episode>,
}

impl EscalationEngine {
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            episodes: DashMap::new(),
        }
    }

    pub fn tiers(&self) -> &[EscalationTier] {
        &self.config.tiers
    }

    /// Tiers passed by an episode that started at `started_at` and not yet
    /// consumed, with their index in the tier table
    ///
    /// Nothing is consumed here; call [`consume`](Self::consume) once the
    /// alert for a tier has been stored.
    pub fn due_tiers(
        &self,
        key: EntityKey,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<(usize, EscalationTier)> {
        let elapsed = now - started_at;
        let mut episode = self
            .episodes
            .entry(key)
            .or_insert_with(|| Episode::new(started_at));
        if episode.started_at != started_at {
            *episode = Episode::new(started_at);
        }

        self.config
            .tiers
            .iter()
            .enumerate()
            .filter(|(index, tier)| elapsed >= tier.threshold() && !episode.consumed.contains(index))
            .map(|(index, tier)| (index, *tier))
            .collect()
    }

    /// Mark a tier of the current episode as alerted
    pub fn consume(&self, key: EntityKey, index: usize) {
        if let Some(mut episode) = self.episodes.get_mut(&key) {
            if episode.consumed.insert(index) {
                debug!(entity = %key, tier = index, "escalation tier consumed");
            }
        }
    }

    /// Start tracking a fresh episode
    pub fn begin_episode(&self, key: EntityKey, started_at: DateTime<Utc>) {
        self.episodes.insert(key, Episode::new(started_at));
    }

    /// Forget the current episode of an entity
    pub fn clear(&self, key: EntityKey) {
        self.episodes.remove(&key);
    }

    /// Whether the engine tracks the episode that started at `started_at`
    pub fn knows_episode(&self, key: EntityKey, started_at: DateTime<Utc>) -> bool {
        self.episodes
            .get(&key)
            .is_some_and(|episode| episode.started_at == started_at)
    }

    /// Rebuild the consumed set of a service episode from alert titles
    /// recorded since the episode started
    pub fn restore_service_episode<'a>(
        &self,
        service: &MonitoredService,
        started_at: DateTime<Utc>,
        recorded_titles: impl IntoIterator<Item = &'a str>,
    ) {
        let recorded: BTreeSet<&str> = recorded_titles.into_iter().collect();
        let mut episode = Episode::new(started_at);
        for (index, tier) in self.config.tiers.iter().enumerate() {
            if recorded.contains(tier_title(service, tier).as_str()) {
                episode.consumed.insert(index);
            }
        }
        self.episodes
            .insert(EntityKey::Service(service.name), episode);
    }

    /// Alert for a status flip, if one is due
    ///
    /// Episode bookkeeping is left to the caller, which knows whether the
    /// alert was stored.
    pub fn transition_alert(
        &self,
        service: &MonitoredService,
        transition: &Transition,
    ) -> Option<NewAlert> {
        match *transition {
            Transition::Failed { at, stale } => {
                let message = if stale {
                    format!(
                        "{} has not reported within the freshness window",
                        service.name
                    )
                } else {
                    match &service.endpoint {
                        Some(endpoint) => format!("Health check against {} failed", endpoint),
                        None => format!("{} reported status down", service.name),
                    }
                };
                Some(
                    NewAlert::new(down_title(service), message, self.config.down_severity, at)
                        .for_service(service.name),
                )
            }
            Transition::Recovered { at, from_down } => {
                if !self.config.send_recovery_notices || !from_down {
                    return None;
                }
                Some(
                    NewAlert::new(
                        format!("{} recovered", service.name),
                        format!("{} is back up", service.name),
                        self.config.recovery_severity,
                        at,
                    )
                    .for_service(service.name),
                )
            }
        }
    }

    /// Down alert for an episode whose transition alert was never stored
    pub fn replayed_down_alert(&self, service: &MonitoredService, now: DateTime<Utc>) -> NewAlert {
        let since = service
            .last_status_change
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "an unknown time".to_string());
        NewAlert::new(
            down_title(service),
            format!("{} has been down since {}", service.name, since),
            self.config.down_severity,
            now,
        )
        .for_service(service.name)
    }

    /// Duration-tier alerts due for a service that is currently down
    ///
    /// Each alert comes with the tier index to [`consume`](Self::consume)
    /// after it is stored.
    pub fn evaluate_service(
        &self,
        service: &MonitoredService,
        now: DateTime<Utc>,
    ) -> Vec<(usize, NewAlert)> {
        let key = EntityKey::Service(service.name);
        let started_at = match (service.status, service.last_status_change) {
            (ServiceStatus::Down, Some(started_at)) => started_at,
            _ => return Vec::new(),
        };

        self.due_tiers(key, started_at, now)
            .into_iter()
            .map(|(index, tier)| {
                let alert = NewAlert::new(
                    tier_title(service, &tier),
                    format!(
                        "{} has been down since {}",
                        service.name,
                        started_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                    tier.severity,
                    now,
                )
                .for_service(service.name);
                (index, alert)
            })
            .collect()
    }
}

/// Title of the transition alert fired when `service` goes down
pub fn down_title(service: &MonitoredService) -> String {
    format!("{} is down", service.name)
}

/// Title of the alert fired when `service` passes `tier`
pub fn tier_title(service: &MonitoredService, tier: &EscalationTier) -> String {
    format!("{} is down for more than {}", service.name, tier.describe())
}
