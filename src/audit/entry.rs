//! Audit entry data structures
//!
//! One entry is written per dispatched domain event. The event's payload is
//! kept as raw JSON so the log stays readable even if event shapes change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{DomainEvent, EventKind, EventPayload};

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the entry was written (UTC)
    pub timestamp: DateTime<Utc>,

    /// When the event happened on the aggregate
    pub occurred_at: DateTime<Utc>,

    /// Full id of the event
    pub event_id: String,

    /// Published event name
    pub event_type: EventKind,

    /// Aggregate that raised the event ("Transaction" or "Budget")
    pub aggregate_type: String,

    /// Full id of that aggregate
    pub aggregate_id: String,

    /// One-line description of what happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Event payload as JSON
    pub payload: serde_json::Value,
}

impl AuditEntry {
    /// Build an entry for a dispatched event
    pub fn from_event(event: &DomainEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            occurred_at: event.occurred_at,
            event_id: event.id.as_uuid().to_string(),
            event_type: event.kind(),
            aggregate_type: event.aggregate_type().to_string(),
            aggregate_id: event.aggregate_id(),
            summary: Some(summarize(&event.payload)),
            payload: serde_json::to_value(&event.payload).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.occurred_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event_type,
            self.aggregate_type,
            &self.aggregate_id[..self.aggregate_id.len().min(8)]
        );

        if let Some(summary) = &self.summary {
            output.push_str(&format!("\n  {}", summary));
        }

        output
    }
}

fn summarize(payload: &EventPayload) -> String {
    match payload {
        EventPayload::TransactionCreated {
            description,
            amount,
            kind,
            ..
        } => format!("{} '{}' recorded: {}", kind, description, amount),
        EventPayload::TransactionUpdated {
            description,
            amount,
            ..
        } => format!("'{}' now {}", description, amount),
        EventPayload::TransactionCategoryChanged {
            old_category_id,
            new_category_id,
            ..
        } => format!("category: {} -> {}", old_category_id, new_category_id),
        EventPayload::BudgetCreated {
            limit, year, month, ..
        } => format!("{:04}-{:02} limit {}", year, month, limit),
        EventPayload::BudgetLimitUpdated {
            old_limit,
            new_limit,
            ..
        } => format!("limit: {} -> {}", old_limit, new_limit),
        EventPayload::BudgetExceeded {
            limit,
            spent,
            year,
            month,
            ..
        } => format!("{:04}-{:02} over budget: {} of {}", year, month, spent, limit),
        EventPayload::BudgetNearLimit {
            limit,
            spent,
            year,
            month,
            ..
        } => format!("{:04}-{:02} near limit: {} of {}", year, month, spent, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetId, CategoryId, Money, TransactionId, TransactionType};
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_from_transaction_event() {
        let transaction_id = TransactionId::new();
        let event = DomainEvent::transaction_created(
            transaction_id,
            "Coffee",
            Money::usd(dec!(4.50)),
            TransactionType::Expense,
            Utc::now(),
        );

        let entry = AuditEntry::from_event(&event);
        assert_eq!(entry.event_type, EventKind::TransactionCreated);
        assert_eq!(entry.aggregate_type, "Transaction");
        assert_eq!(entry.aggregate_id, transaction_id.as_uuid().to_string());
        assert_eq!(entry.event_id, event.id.as_uuid().to_string());
        assert_eq!(entry.payload["type"], "transaction_created");
        assert_eq!(
            entry.summary.as_deref(),
            Some("Expense 'Coffee' recorded: 4.50 USD")
        );
    }

    #[test]
    fn test_serialization_uses_event_names() {
        let event = DomainEvent::budget_exceeded(
            BudgetId::new(),
            CategoryId::new(),
            Money::usd(dec!(100)),
            Money::usd(dec!(104)),
            2025,
            1,
        );
        let entry = AuditEntry::from_event(&event);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"BudgetExceededEvent\""));

        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type, EventKind::BudgetExceeded);
        assert_eq!(deserialized.aggregate_type, "Budget");
    }

    #[test]
    fn test_human_readable_format() {
        let event = DomainEvent::budget_limit_updated(
            BudgetId::new(),
            Money::usd(dec!(100)),
            Money::usd(dec!(150)),
        );
        let formatted = AuditEntry::from_event(&event).format_human_readable();

        assert!(formatted.contains("BudgetLimitUpdatedEvent"));
        assert!(formatted.contains("Budget"));
        assert!(formatted.contains("limit: 100.00 USD -> 150.00 USD"));
    }
}
