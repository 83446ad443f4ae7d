// ============================================================================
// Lifecycle events
// ============================================================================

use crate::core::{Record, Result};
use crate::soft_delete::SoftDeletePolicy;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Lifecycle events emitted by the soft-delete governor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    /// Emitted before the deletion timestamp is written
    PreSoftDelete,
    /// Emitted after the timestamp update reached the store
    PostSoftDelete,
}

impl LifecycleEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PreSoftDelete => "preSoftDelete",
            Self::PostSoftDelete => "postSoftDelete",
        }
    }
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload carried by both soft-delete events.
#[derive(Debug, Clone)]
pub struct SoftDeleteEventArgs {
    /// Snapshot of the record at emission time
    pub entity: Record,
    pub entity_type: String,
    pub policy: Arc<SoftDeletePolicy>,
}

#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    pub kind: LifecycleEventKind,
    pub args: SoftDeleteEventArgs,
}

/// Observer of lifecycle events. Subscribers cannot veto an operation.
pub trait EventSubscriber: Send + Sync {
    /// Queried once, when the subscriber is added to the bus.
    fn subscribed_events(&self) -> Vec<LifecycleEventKind>;

    fn on_event(&self, event: &LifecycleEvent);
}

struct FnSubscriber<F> {
    kinds: Vec<LifecycleEventKind>,
    handler: F,
}

impl<F> EventSubscriber for FnSubscriber<F>
where
    F: Fn(&LifecycleEvent) + Send + Sync,
{
    fn subscribed_events(&self) -> Vec<LifecycleEventKind> {
        self.kinds.clone()
    }

    fn on_event(&self, event: &LifecycleEvent) {
        (self.handler)(event)
    }
}

struct Subscription {
    kinds: Vec<LifecycleEventKind>,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Typed publish/subscribe hub shared by every session of an engine.
#[derive(Default)]
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> Result<()> {
        let kinds = subscriber.subscribed_events();
        let mut subscriptions = self.subscriptions.write()?;
        subscriptions.push(Subscription { kinds, subscriber });
        Ok(())
    }

    /// Subscribe a closure to the given event kinds.
    pub fn subscribe_fn<F>(&self, kinds: &[LifecycleEventKind], handler: F) -> Result<()>
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnSubscriber {
            kinds: kinds.to_vec(),
            handler,
        }))
    }

    /// Delivers `event` to every subscriber registered for its kind, in
    /// subscription order.
    ///
    /// Never fails: a poisoned subscription list is still read, since pushes
    /// are the only writes and cannot leave it half-updated.
    pub fn publish(&self, event: &LifecycleEvent) {
        // Handlers run outside the lock so they may subscribe reentrantly.
        let targets: Vec<Arc<dyn EventSubscriber>> = {
            let subscriptions = self
                .subscriptions
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            subscriptions
                .iter()
                .filter(|s| s.kinds.contains(&event.kind))
                .map(|s| s.subscriber.clone())
                .collect()
        };

        trace!(
            event = %event.kind,
            entity_type = %event.args.entity_type,
            listeners = targets.len(),
            "publishing lifecycle event"
        );

        for subscriber in targets {
            subscriber.on_event(event);
        }
    }

    pub fn has_listeners(&self, kind: LifecycleEventKind) -> Result<bool> {
        let subscriptions = self.subscriptions.read()?;
        Ok(subscriptions.iter().any(|s| s.kinds.contains(&kind)))
    }
}
