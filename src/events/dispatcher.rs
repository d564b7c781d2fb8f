//! Synchronous, in-process event bus with per-kind subscription.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{DomainEvent, EventKind};
use crate::error::FinanceResult;

/// Something that reacts to dispatched domain events.
///
/// Handlers run after the commit has succeeded. A returned error is logged
/// and does not stop delivery to other handlers; nothing is retried.
pub trait DomainEventHandler: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    fn handle(&self, event: &DomainEvent) -> FinanceResult<()>;
}

/// Routes events to the handlers registered for their kind.
#[derive(Default)]
pub struct EventDispatcher {
    by_kind: HashMap<EventKind, Vec<Arc<dyn DomainEventHandler>>>,
    catch_all: Vec<Arc<dyn DomainEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn DomainEventHandler>) {
        self.by_kind.entry(kind).or_default().push(handler);
    }

    /// Register a handler for every event kind.
    pub fn subscribe_all(&mut self, handler: Arc<dyn DomainEventHandler>) {
        self.catch_all.push(handler);
    }

    /// Number of handlers that would receive an event of this kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len) + self.catch_all.len()
    }

    /// Deliver events in order.
    ///
    /// Kind-specific handlers run before catch-all handlers, each group in
    /// registration order. Returns how many handler invocations failed.
    pub fn dispatch(&self, events: &[DomainEvent]) -> usize {
        let mut failures = 0;

        for event in events {
            let kind = event.kind();
            let specific = self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[]);

            for handler in specific.iter().chain(self.catch_all.iter()) {
                if let Err(e) = handler.handle(event) {
                    failures += 1;
                    warn!(
                        handler = handler.name(),
                        event = %kind,
                        event_id = %event.id,
                        error = %e,
                        "event handler failed"
                    );
                }
            }
        }

        debug!(count = events.len(), failures, "dispatched domain events");
        failures
    }
}
