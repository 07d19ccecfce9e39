//! Per-entity serialization
//!
//! Every read-modify-write of one service or pipeline run (state machine,
//! escalation bookkeeping, alert emission) runs under that entity's mutex.
//! Distinct entities never contend.

use crate::core::models::{PipelineType, ServiceName};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Identity of a monitored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Service(ServiceName),
    PipelineRun(i64),
    /// Run lookup and creation for reports that carry no run id
    Pipeline(PipelineType),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Service(name) => write!(f, "service:{}", name),
            EntityKey::PipelineRun(id) => write!(f, "pipeline_run:{}", id),
            EntityKey::Pipeline(pipeline_type) => write!(f, "pipeline:{}", pipeline_type),
        }
    }
}

/// Lazily created async mutex per entity
#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: DashMap<EntityKey, Arc<Mutex<()>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: EntityKey) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Drop the mutex of an entity that no longer exists
    pub fn forget(&self, key: EntityKey) {
        self.locks
            .remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
