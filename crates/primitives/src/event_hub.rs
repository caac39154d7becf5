//! EventHub: write-path interception for a collection
//!
//! ## Design
//!
//! Every document write goes through the hub before it reaches the backing
//! store. The collection stages its own document op into a [`Batch`], then
//! publishes the event; each handler subscribed to that event kind may read
//! the store and append further ops to the same batch. The collection then
//! sends the whole batch as one pipelined round trip.
//!
//! Handlers run sequentially, in registration order, each seeing the ops
//! staged by the ones before it. The first error aborts the publish and is
//! returned to the writer, which discards the batch.
//!
//! ## Thread Safety
//!
//! Registration is guarded by a `parking_lot::RwLock`. Publishing snapshots
//! the matching handlers and releases the lock before awaiting anything, so
//! subscribing or unsubscribing while a publish is in flight never blocks
//! and never affects that in-flight publish.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use strata_core::{Batch, Document, Result};
use tracing::{debug, trace};
use uuid::Uuid;

/// Write event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A document was written for the first time (or upserted)
    Created,
    /// An existing document was replaced through `update`
    Updated,
    /// A document was removed
    Deleted,
}

impl EventKind {
    /// Lowercase name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked for each published event
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stage side effects of `kind` on `documents` into `batch`
    ///
    /// Handlers may read the store but must not write to it directly;
    /// anything they stage is applied together with the triggering write.
    async fn handle(&self, kind: EventKind, batch: &mut Batch, documents: &[Document])
        -> Result<()>;
}

/// Token identifying one registration
///
/// Pass it back to [`EventHub::unsubscribe`]. Registering the same handler
/// twice yields two distinct subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: Uuid,
}

impl Subscription {
    /// Event kind this subscription listens to
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

struct Registration {
    kind: EventKind,
    id: Uuid,
    handler: Arc<dyn EventHandler>,
}

/// Per-collection registry of write handlers
#[derive(Default)]
pub struct EventHub {
    handlers: RwLock<Vec<Registration>>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

impl EventHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`
    pub fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Subscription {
        let id = Uuid::new_v4();
        self.handlers.write().push(Registration { kind, id, handler });
        debug!(target: "strata::hub", %kind, %id, "Handler subscribed");
        Subscription { kind, id }
    }

    /// Remove a registration
    ///
    /// Returns `false` if it was already removed; calling twice is harmless.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|r| r.id != subscription.id);
        let removed = handlers.len() != before;
        if removed {
            debug!(target: "strata::hub", kind = %subscription.kind, id = %subscription.id, "Handler unsubscribed");
        }
        removed
    }

    /// Number of handlers registered for `kind`
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().iter().filter(|r| r.kind == kind).count()
    }

    /// Run every handler registered for `kind`, in registration order
    ///
    /// # Errors
    ///
    /// Returns the first handler error; later handlers are not run.
    pub async fn publish(
        &self,
        kind: EventKind,
        batch: &mut Batch,
        documents: &[Document],
    ) -> Result<()> {
        let snapshot: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Arc::clone(&r.handler))
            .collect();

        trace!(
            target: "strata::hub",
            %kind,
            handlers = snapshot.len(),
            documents = documents.len(),
            "Publishing event"
        );

        for handler in snapshot {
            handler.handle(kind, batch, documents).await?;
        }
        Ok(())
    }
}
