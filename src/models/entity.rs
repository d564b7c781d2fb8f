//! Shared entity bookkeeping
//!
//! Every aggregate embeds an [`EntityMeta`] holding its timestamps and the
//! domain events raised since the last drain. The event buffer is never
//! persisted; only the unit of work empties it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;

/// Timestamps and pending events embedded in every aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMeta {
    /// When the entity was created
    pub created_at: DateTime<Utc>,

    /// When the entity was last modified
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    pending_events: Vec<DomainEvent>,
}

impl EntityMeta {
    /// Metadata for an entity created now
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
            pending_events: Vec::new(),
        }
    }

    /// Stamp the entity as modified now
    pub fn mark_updated(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Queue a domain event
    pub fn record(&mut self, event: DomainEvent) {
        self.pending_events.push(event);
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    /// Remove and return all queued events
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Drop all queued events
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity that owns its invariants and may raise domain events
pub trait Aggregate {
    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Read-only view of the pending events
    fn domain_events(&self) -> &[DomainEvent] {
        self.meta().events()
    }

    fn clear_domain_events(&mut self) {
        self.meta_mut().clear_events();
    }

    /// Drain the pending events
    fn take_domain_events(&mut self) -> Vec<DomainEvent> {
        self.meta_mut().take_events()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.meta().updated_at
    }
}
