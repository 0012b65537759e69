//! The entity registry

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{CleanupError, CleanupOutcome, CleanupState, EntityKind, RegisteredEntity};

/// Ordered collection of entities created during the current test
///
/// `add` and the drains serialize on one lock. A drain swaps the pending
/// entities out before awaiting any callback, so entities added while a
/// cleanup is in flight stay registered for the next drain.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Mutex<Vec<RegisteredEntity>>,
}

/// Point-in-time counts of registered entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    /// Only kinds with at least one entity appear
    pub by_type: BTreeMap<EntityKind, usize>,
}

/// Per-entity results of a drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub outcomes: Vec<CleanupOutcome>,
}

impl CleanupReport {
    /// Number of entities whose callback succeeded
    pub fn cleaned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_cleaned()).count()
    }

    /// Entities whose callback failed
    pub fn failures(&self) -> impl Iterator<Item = &CleanupOutcome> {
        self.outcomes.iter().filter(|o| !o.is_cleaned())
    }

    /// True when every callback succeeded
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entities(&self) -> MutexGuard<'_, Vec<RegisteredEntity>> {
        // A panic while holding the lock cannot leave the Vec half-modified
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entity; duplicates are not detected
    pub fn add(&self, entity: RegisteredEntity) {
        debug!(kind = %entity.kind, id = %entity.id, "Registering entity for cleanup");
        self.entities().push(entity);
    }

    /// Drop every entry without running its cleanup
    ///
    /// For test setup only. Anything still registered is leaked on the server.
    pub fn clear(&self) {
        let mut entities = self.entities();
        if !entities.is_empty() {
            debug!(count = entities.len(), "Clearing registry without cleanup");
        }
        entities.clear();
    }

    /// Counts by kind
    pub fn stats(&self) -> RegistryStats {
        let entities = self.entities();
        let mut by_type = BTreeMap::new();
        for entity in entities.iter() {
            *by_type.entry(entity.kind).or_insert(0) += 1;
        }
        RegistryStats {
            total: entities.len(),
            by_type,
        }
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }

    /// Whether an entity with this kind and id is registered
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.entities()
            .iter()
            .any(|e| e.kind == kind && e.id == id)
    }

    /// Run every cleanup callback concurrently and empty the registry
    ///
    /// Failures are logged as warnings and never stop the other callbacks.
    pub async fn cleanup_all(&self) -> CleanupReport {
        let drained = std::mem::take(&mut *self.entities());
        run_cleanups(drained).await
    }

    /// Like [`EntityRegistry::cleanup_all`], restricted to one kind
    ///
    /// Entities of other kinds stay registered.
    pub async fn cleanup_by_type(&self, kind: EntityKind) -> CleanupReport {
        let drained = {
            let mut entities = self.entities();
            let (matching, remaining): (Vec<_>, Vec<_>) =
                std::mem::take(&mut *entities).into_iter().partition(|e| e.kind == kind);
            *entities = remaining;
            matching
        };
        run_cleanups(drained).await
    }
}

async fn run_cleanups(entities: Vec<RegisteredEntity>) -> CleanupReport {
    if entities.is_empty() {
        return CleanupReport::default();
    }

    let count = entities.len();
    let outcomes = join_all(entities.into_iter().map(run_cleanup)).await;
    let report = CleanupReport { outcomes };

    info!(
        total = count,
        cleaned = report.cleaned(),
        failed = count - report.cleaned(),
        "Registry drained"
    );
    report
}

async fn run_cleanup(entity: RegisteredEntity) -> CleanupOutcome {
    let RegisteredEntity {
        kind,
        id,
        display_name,
        cleanup,
    } = entity;

    let result = AssertUnwindSafe(async move { cleanup().await })
        .catch_unwind()
        .await
        .unwrap_or(Err(CleanupError::Panicked));

    let state = match result {
        Ok(()) => {
            debug!(kind = %kind, id = %id, "Entity cleaned up");
            CleanupState::Cleaned
        }
        Err(err) => {
            warn!(kind = %kind, id = %id, error = %err, "Failed to clean up entity");
            CleanupState::CleanupFailed(err.to_string())
        }
    };

    CleanupOutcome {
        kind,
        id,
        display_name,
        state,
    }
}
