//! Transaction model
//!
//! A transaction records a single income or expense movement against a
//! category. The category is referenced by id only; checking that its kind
//! matches the transaction's kind is the transaction service's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entity::{Aggregate, EntityMeta};
use super::ids::{CategoryId, TransactionId};
use super::money::Money;
use crate::error::{FinanceError, FinanceResult};
use crate::events::DomainEvent;

/// Longest allowed description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Longest allowed notes, in characters
pub const MAX_NOTES_LEN: usize = 500;

/// Whether money comes in or goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FinanceError::invalid(
                "type",
                format!("'{}' is not Income or Expense", other),
            )),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    description: String,
    amount: Money,
    kind: TransactionType,
    date: DateTime<Utc>,
    category_id: CategoryId,
    #[serde(default)]
    notes: Option<String>,
    #[serde(flatten)]
    meta: EntityMeta,
}

impl Transaction {
    /// Create a new transaction, raising `TransactionCreated`
    pub fn new(
        description: &str,
        amount: Money,
        kind: TransactionType,
        date: DateTime<Utc>,
        category_id: CategoryId,
        notes: Option<&str>,
    ) -> FinanceResult<Self> {
        let description = validate_description(description)?;
        validate_amount(&amount)?;
        validate_date(date)?;
        validate_category(category_id)?;
        let notes = validate_notes(notes)?;

        let mut txn = Self {
            id: TransactionId::new(),
            description,
            amount,
            kind,
            date,
            category_id,
            notes,
            meta: EntityMeta::new(),
        };

        let event = DomainEvent::transaction_created(
            txn.id,
            txn.description.clone(),
            txn.amount.clone(),
            txn.kind,
            txn.date,
        );
        txn.meta.record(event);

        Ok(txn)
    }

    /// Replace description, amount, date and notes, raising `TransactionUpdated`
    ///
    /// Kind and category are left untouched.
    pub fn update_details(
        &mut self,
        description: &str,
        amount: Money,
        date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> FinanceResult<()> {
        let description = validate_description(description)?;
        validate_amount(&amount)?;
        validate_date(date)?;
        let notes = validate_notes(notes)?;

        self.description = description;
        self.amount = amount;
        self.date = date;
        self.notes = notes;
        self.meta.mark_updated();

        let event = DomainEvent::transaction_updated(
            self.id,
            self.description.clone(),
            self.amount.clone(),
            self.kind,
            self.date,
        );
        self.meta.record(event);

        Ok(())
    }

    /// Point the transaction at another category, raising `TransactionCategoryChanged`
    ///
    /// The new category's kind is not checked here.
    pub fn change_category(&mut self, new_category_id: CategoryId) -> FinanceResult<()> {
        validate_category(new_category_id)?;

        let old_category_id = self.category_id;
        self.category_id = new_category_id;
        self.meta.mark_updated();

        self.meta.record(DomainEvent::transaction_category_changed(
            self.id,
            old_category_id,
            new_category_id,
        ));

        Ok(())
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }
}

impl Aggregate for Transaction {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.kind
        )
    }
}

fn validate_description(description: &str) -> FinanceResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(FinanceError::invalid(
            "description",
            "Transaction description cannot be empty",
        ));
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(FinanceError::invalid(
            "description",
            format!(
                "Transaction description cannot exceed {} characters",
                MAX_DESCRIPTION_LEN
            ),
        ));
    }

    Ok(description.to_string())
}

fn validate_amount(amount: &Money) -> FinanceResult<()> {
    if !amount.is_positive() {
        return Err(FinanceError::invalid(
            "amount",
            "Transaction amount must be positive",
        ));
    }
    Ok(())
}

fn validate_date(date: DateTime<Utc>) -> FinanceResult<()> {
    if date > Utc::now() {
        return Err(FinanceError::invalid(
            "date",
            "Transaction date cannot be in the future",
        ));
    }
    Ok(())
}

fn validate_category(category_id: CategoryId) -> FinanceResult<()> {
    if category_id.is_nil() {
        return Err(FinanceError::invalid(
            "category",
            "Transaction must have a valid category",
        ));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> FinanceResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(FinanceError::invalid(
            "notes",
            format!("Notes cannot exceed {} characters", MAX_NOTES_LEN),
        ));
    }

    Ok(Some(notes.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, EventPayload};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn groceries() -> Transaction {
        Transaction::new(
            "Grocery shopping",
            Money::usd(dec!(150.75)),
            TransactionType::Expense,
            Utc::now() - Duration::days(1),
            CategoryId::new(),
            Some("Weekly groceries"),
        )
        .unwrap()
    }

    #[test]
    fn test_create_raises_single_created_event() {
        let date = Utc::now() - Duration::days(1);
        let txn = Transaction::new(
            "Grocery shopping",
            Money::usd(dec!(150.75)),
            TransactionType::Expense,
            date,
            CategoryId::new(),
            None,
        )
        .unwrap();

        assert_eq!(txn.domain_events().len(), 1);
        match &txn.domain_events()[0].payload {
            EventPayload::TransactionCreated {
                transaction_id,
                description,
                amount,
                kind,
                date: event_date,
            } => {
                assert_eq!(*transaction_id, txn.id());
                assert_eq!(description, "Grocery shopping");
                assert_eq!(*amount, Money::usd(dec!(150.75)));
                assert_eq!(*kind, TransactionType::Expense);
                assert_eq!(*event_date, date);
            }
            other => panic!("Expected TransactionCreated, got {:?}", other),
        }
    }

    #[test]
    fn test_description_validation() {
        let make = |description: &str| {
            Transaction::new(
                description,
                Money::usd(dec!(1)),
                TransactionType::Expense,
                Utc::now(),
                CategoryId::new(),
                None,
            )
        };

        assert!(make("   ").unwrap_err().is_invalid_argument());
        assert!(make(&"x".repeat(201)).is_err());
        assert!(make(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn test_amount_must_be_positive() {
        for amount in [dec!(0), dec!(-5)] {
            let err = Transaction::new(
                "Coffee",
                Money::usd(amount),
                TransactionType::Expense,
                Utc::now(),
                CategoryId::new(),
                None,
            )
            .unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn test_future_date_rejected() {
        let err = Transaction::new(
            "Rent",
            Money::usd(dec!(900)),
            TransactionType::Expense,
            Utc::now() + Duration::minutes(5),
            CategoryId::new(),
            None,
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_current_instant_accepted() {
        let now = Utc::now();
        assert!(Transaction::new(
            "Rent",
            Money::usd(dec!(900)),
            TransactionType::Expense,
            now,
            CategoryId::new(),
            None,
        )
        .is_ok());
    }

    #[test]
    fn test_nil_category_rejected() {
        let err = Transaction::new(
            "Salary",
            Money::usd(dec!(5500)),
            TransactionType::Income,
            Utc::now(),
            CategoryId::nil(),
            None,
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_notes_validation() {
        let long = "n".repeat(501);
        assert!(Transaction::new(
            "Salary",
            Money::usd(dec!(5500)),
            TransactionType::Income,
            Utc::now(),
            CategoryId::new(),
            Some(&long),
        )
        .is_err());
    }

    #[test]
    fn test_update_then_clear_then_update_yields_one_event() {
        let mut txn = groceries();
        txn.clear_domain_events();

        txn.update_details("Groceries", Money::usd(dec!(160)), Utc::now(), None)
            .unwrap();
        txn.clear_domain_events();
        txn.update_details("Groceries", Money::usd(dec!(175.50)), Utc::now(), Some("Updated"))
            .unwrap();

        assert_eq!(txn.domain_events().len(), 1);
        assert_eq!(txn.domain_events()[0].kind(), EventKind::TransactionUpdated);
        assert_eq!(txn.amount(), &Money::usd(dec!(175.50)));
        assert_eq!(txn.notes(), Some("Updated"));
        assert_eq!(txn.kind(), TransactionType::Expense);
        assert!(txn.updated_at().is_some());
    }

    #[test]
    fn test_failed_update_leaves_state_untouched() {
        let mut txn = groceries();
        txn.clear_domain_events();

        let err = txn
            .update_details("Groceries", Money::usd(dec!(-1)), Utc::now(), None)
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(txn.amount(), &Money::usd(dec!(150.75)));
        assert!(txn.domain_events().is_empty());
    }

    #[test]
    fn test_change_category() {
        let mut txn = groceries();
        let old = txn.category_id();
        let new = CategoryId::new();
        txn.clear_domain_events();

        txn.change_category(new).unwrap();

        assert_eq!(txn.category_id(), new);
        assert_eq!(txn.domain_events().len(), 1);
        match &txn.domain_events()[0].payload {
            EventPayload::TransactionCategoryChanged {
                old_category_id,
                new_category_id,
                ..
            } => {
                assert_eq!(*old_category_id, old);
                assert_eq!(*new_category_id, new);
            }
            other => panic!("Expected TransactionCategoryChanged, got {:?}", other),
        }

        assert!(txn.change_category(CategoryId::nil()).is_err());
        assert_eq!(txn.category_id(), new);
    }

    #[test]
    fn test_type_parse() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("EXPENSE".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_serialization_drops_pending_events() {
        let txn = groceries();
        let json = serde_json::to_string(&txn).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), txn.id());
        assert_eq!(deserialized.amount(), txn.amount());
        assert!(deserialized.domain_events().is_empty());
    }
}
