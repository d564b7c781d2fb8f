//! Domain event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FinanceError, FinanceResult};
use crate::models::{BudgetId, CategoryId, EventId, Money, TransactionId, TransactionType};

/// A fact about an aggregate, queued on it until the unit of work dispatches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: EventId,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    TransactionCreated {
        transaction_id: TransactionId,
        description: String,
        amount: Money,
        kind: TransactionType,
        date: DateTime<Utc>,
    },

    TransactionUpdated {
        transaction_id: TransactionId,
        description: String,
        amount: Money,
        kind: TransactionType,
        date: DateTime<Utc>,
    },

    TransactionCategoryChanged {
        transaction_id: TransactionId,
        old_category_id: CategoryId,
        new_category_id: CategoryId,
    },

    BudgetCreated {
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        year: i32,
        month: u32,
    },

    BudgetLimitUpdated {
        budget_id: BudgetId,
        old_limit: Money,
        new_limit: Money,
    },

    /// Spending went past the limit.
    BudgetExceeded {
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        spent: Money,
        year: i32,
        month: u32,
    },

    /// Spending reached 80% of the limit without exceeding it.
    BudgetNearLimit {
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        spent: Money,
        year: i32,
        month: u32,
    },
}

impl DomainEvent {
    /// Wraps a payload with a fresh id and the current time.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn transaction_created(
        transaction_id: TransactionId,
        description: impl Into<String>,
        amount: Money,
        kind: TransactionType,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(EventPayload::TransactionCreated {
            transaction_id,
            description: description.into(),
            amount,
            kind,
            date,
        })
    }

    pub fn transaction_updated(
        transaction_id: TransactionId,
        description: impl Into<String>,
        amount: Money,
        kind: TransactionType,
        date: DateTime<Utc>,
    ) -> Self {
        Self::new(EventPayload::TransactionUpdated {
            transaction_id,
            description: description.into(),
            amount,
            kind,
            date,
        })
    }

    pub fn transaction_category_changed(
        transaction_id: TransactionId,
        old_category_id: CategoryId,
        new_category_id: CategoryId,
    ) -> Self {
        Self::new(EventPayload::TransactionCategoryChanged {
            transaction_id,
            old_category_id,
            new_category_id,
        })
    }

    pub fn budget_created(
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        year: i32,
        month: u32,
    ) -> Self {
        Self::new(EventPayload::BudgetCreated {
            budget_id,
            category_id,
            limit,
            year,
            month,
        })
    }

    pub fn budget_limit_updated(budget_id: BudgetId, old_limit: Money, new_limit: Money) -> Self {
        Self::new(EventPayload::BudgetLimitUpdated {
            budget_id,
            old_limit,
            new_limit,
        })
    }

    pub fn budget_exceeded(
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        spent: Money,
        year: i32,
        month: u32,
    ) -> Self {
        Self::new(EventPayload::BudgetExceeded {
            budget_id,
            category_id,
            limit,
            spent,
            year,
            month,
        })
    }

    pub fn budget_near_limit(
        budget_id: BudgetId,
        category_id: CategoryId,
        limit: Money,
        spent: Money,
        year: i32,
        month: u32,
    ) -> Self {
        Self::new(EventPayload::BudgetNearLimit {
            budget_id,
            category_id,
            limit,
            spent,
            year,
            month,
        })
    }

    /// The subscription key for this event.
    pub fn kind(&self) -> EventKind {
        match &self.payload {
            EventPayload::TransactionCreated { .. } => EventKind::TransactionCreated,
            EventPayload::TransactionUpdated { .. } => EventKind::TransactionUpdated,
            EventPayload::TransactionCategoryChanged { .. } => {
                EventKind::TransactionCategoryChanged
            }
            EventPayload::BudgetCreated { .. } => EventKind::BudgetCreated,
            EventPayload::BudgetLimitUpdated { .. } => EventKind::BudgetLimitUpdated,
            EventPayload::BudgetExceeded { .. } => EventKind::BudgetExceeded,
            EventPayload::BudgetNearLimit { .. } => EventKind::BudgetNearLimit,
        }
    }

    /// Name of the aggregate type that raised the event.
    pub fn aggregate_type(&self) -> &'static str {
        match &self.payload {
            EventPayload::TransactionCreated { .. }
            | EventPayload::TransactionUpdated { .. }
            | EventPayload::TransactionCategoryChanged { .. } => "Transaction",
            _ => "Budget",
        }
    }

    /// Full id of the aggregate that raised the event.
    pub fn aggregate_id(&self) -> String {
        match &self.payload {
            EventPayload::TransactionCreated { transaction_id, .. }
            | EventPayload::TransactionUpdated { transaction_id, .. }
            | EventPayload::TransactionCategoryChanged { transaction_id, .. } => {
                transaction_id.as_uuid().to_string()
            }
            EventPayload::BudgetCreated { budget_id, .. }
            | EventPayload::BudgetLimitUpdated { budget_id, .. }
            | EventPayload::BudgetExceeded { budget_id, .. }
            | EventPayload::BudgetNearLimit { budget_id, .. } => budget_id.as_uuid().to_string(),
        }
    }
}

/// Event type names that handlers subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "TransactionCreatedEvent")]
    TransactionCreated,
    #[serde(rename = "TransactionUpdatedEvent")]
    TransactionUpdated,
    #[serde(rename = "TransactionCategoryChangedEvent")]
    TransactionCategoryChanged,
    #[serde(rename = "BudgetCreatedEvent")]
    BudgetCreated,
    #[serde(rename = "BudgetLimitUpdatedEvent")]
    BudgetLimitUpdated,
    #[serde(rename = "BudgetExceededEvent")]
    BudgetExceeded,
    #[serde(rename = "BudgetNearLimitEvent")]
    BudgetNearLimit,
}

impl EventKind {
    /// Every event kind, in declaration order
    pub fn all() -> &'static [Self] {
        &[
            Self::TransactionCreated,
            Self::TransactionUpdated,
            Self::TransactionCategoryChanged,
            Self::BudgetCreated,
            Self::BudgetLimitUpdated,
            Self::BudgetExceeded,
            Self::BudgetNearLimit,
        ]
    }

    /// The published event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransactionCreated => "TransactionCreatedEvent",
            Self::TransactionUpdated => "TransactionUpdatedEvent",
            Self::TransactionCategoryChanged => "TransactionCategoryChangedEvent",
            Self::BudgetCreated => "BudgetCreatedEvent",
            Self::BudgetLimitUpdated => "BudgetLimitUpdatedEvent",
            Self::BudgetExceeded => "BudgetExceededEvent",
            Self::BudgetNearLimit => "BudgetNearLimitEvent",
        }
    }

    /// Look up a kind by its published name
    pub fn from_name(name: &str) -> FinanceResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| FinanceError::invalid("event", format!("unknown event name '{}'", name)))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
