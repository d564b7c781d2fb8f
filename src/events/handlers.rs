//! Built-in event handlers.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::{DomainEvent, DomainEventHandler, EventPayload};
use crate::audit::{AuditEntry, AuditLogger};
use crate::error::{FinanceError, FinanceResult};

/// Writes every event to the tracing log.
///
/// Budget overruns are logged at `warn`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl DomainEventHandler for LoggingHandler {
    fn name(&self) -> &str {
        "logging"
    }

    fn handle(&self, event: &DomainEvent) -> FinanceResult<()> {
        match &event.payload {
            EventPayload::TransactionCreated {
                transaction_id,
                description,
                amount,
                kind,
                ..
            } => info!(
                transaction = %transaction_id,
                %amount,
                %kind,
                "transaction created: {}",
                description
            ),
            EventPayload::TransactionUpdated {
                transaction_id,
                amount,
                ..
            } => info!(transaction = %transaction_id, %amount, "transaction updated"),
            EventPayload::TransactionCategoryChanged {
                transaction_id,
                old_category_id,
                new_category_id,
            } => info!(
                transaction = %transaction_id,
                from = %old_category_id,
                to = %new_category_id,
                "transaction category changed"
            ),
            EventPayload::BudgetCreated {
                budget_id,
                limit,
                year,
                month,
                ..
            } => info!(budget = %budget_id, %limit, year, month, "budget created"),
            EventPayload::BudgetLimitUpdated {
                budget_id,
                old_limit,
                new_limit,
            } => info!(
                budget = %budget_id,
                old = %old_limit,
                new = %new_limit,
                "budget limit updated"
            ),
            EventPayload::BudgetNearLimit {
                budget_id,
                limit,
                spent,
                ..
            } => info!(budget = %budget_id, %spent, %limit, "budget near limit"),
            EventPayload::BudgetExceeded {
                budget_id,
                category_id,
                limit,
                spent,
                year,
                month,
            } => warn!(
                budget = %budget_id,
                category = %category_id,
                %spent,
                %limit,
                "budget exceeded for {:04}-{:02}",
                year,
                month
            ),
        }
        Ok(())
    }
}

/// Appends every event to the audit log.
#[derive(Debug, Clone)]
pub struct AuditHandler {
    logger: AuditLogger,
}

impl AuditHandler {
    pub fn new(logger: AuditLogger) -> Self {
        Self { logger }
    }
}

impl DomainEventHandler for AuditHandler {
    fn name(&self) -> &str {
        "audit"
    }

    fn handle(&self, event: &DomainEvent) -> FinanceResult<()> {
        self.logger.log(&AuditEntry::from_event(event))
    }
}

/// Keeps a copy of every event it receives.
///
/// Clones share the same buffer, so a test can subscribe one clone and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in delivery order.
    pub fn events(&self) -> Vec<DomainEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainEventHandler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    fn handle(&self, event: &DomainEvent) -> FinanceResult<()> {
        self.events
            .lock()
            .map_err(|e| FinanceError::Storage(format!("Recorder lock poisoned: {}", e)))?
            .push(event.clone());
        Ok(())
    }
}
