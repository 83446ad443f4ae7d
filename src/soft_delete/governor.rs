// ============================================================================
// Lifecycle Governor
// ============================================================================

use super::SoftDeletePolicy;
use crate::core::{Record, Result};
use crate::events::{EventBus, LifecycleEvent, LifecycleEventKind, SoftDeleteEventArgs};
use crate::storage::EntityStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// What a delete request turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The deletion timestamp was written; the record is still stored.
    SoftDeleted { deleted_at: DateTime<Utc> },
    /// The record was removed from the store.
    HardDeleted { existed: bool },
}

/// Turns deletes of soft-deleteable entities into timestamp updates.
///
/// Deletion timestamps come from the store's clock, the same clock that
/// evaluates time-aware visibility, so a stamped record is hidden on the
/// next read regardless of skew between the application and the store.
pub struct LifecycleGovernor {
    bus: Arc<EventBus>,
}

impl LifecycleGovernor {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Deletes `record` according to `policy`.
    ///
    /// Without a policy this is a plain physical delete. With one, PRE is
    /// published, the timestamp is set to the store's now and written with `update`,
    /// then POST is published. A record whose timestamp already lies at or
    /// before now is removed physically when the policy allows hard deletes.
    /// On success `record` holds the state that was written.
    pub async fn remove(
        &self,
        store: &dyn EntityStore,
        record: &mut Record,
        policy: Option<&Arc<SoftDeletePolicy>>,
    ) -> Result<DeleteOutcome> {
        let span = info_span!(
            "soft_delete.remove",
            entity_type = %record.entity_type(),
            entity_id = %record.id()
        );

        self.remove_in_span(store, record, policy)
            .instrument(span)
            .await
    }

    async fn remove_in_span(
        &self,
        store: &dyn EntityStore,
        record: &mut Record,
        policy: Option<&Arc<SoftDeletePolicy>>,
    ) -> Result<DeleteOutcome> {
        let Some(policy) = policy else {
            let existed = store.remove(record).await?;
            event!(Level::DEBUG, existed, "no soft-delete policy, removed physically");
            return Ok(DeleteOutcome::HardDeleted { existed });
        };

        let now = store.now();
        if policy.is_hard_delete() && Self::already_deleted(record, policy, now) {
            let existed = store.remove(record).await?;
            event!(Level::INFO, existed, "record already soft-deleted, removed physically");
            return Ok(DeleteOutcome::HardDeleted { existed });
        }

        self.publish(LifecycleEventKind::PreSoftDelete, record, policy);

        let mut updated = record.clone();
        updated.set(policy.field(), now);
        store.update(&updated).await?;
        *record = updated;

        self.publish(LifecycleEventKind::PostSoftDelete, record, policy);
        event!(Level::DEBUG, deleted_at = %now, "record soft-deleted");

        Ok(DeleteOutcome::SoftDeleted { deleted_at: now })
    }

    fn already_deleted(record: &Record, policy: &SoftDeletePolicy, now: DateTime<Utc>) -> bool {
        record
            .get(policy.field())
            .as_timestamp()
            .is_some_and(|deleted_at| deleted_at <= now)
    }

    fn publish(&self, kind: LifecycleEventKind, record: &Record, policy: &Arc<SoftDeletePolicy>) {
        self.bus.publish(&LifecycleEvent {
            kind,
            args: SoftDeleteEventArgs {
                entity: record.clone(),
                entity_type: record.entity_type().to_string(),
                policy: policy.clone(),
            },
        })
    }
}
