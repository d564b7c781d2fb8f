//! Transaction service
//!
//! Checks a transaction against its category before touching the aggregate,
//! and keeps the matching monthly budget's `spent` total up to date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::{Category, CategoryId, Money, Transaction, TransactionId, TransactionType};
use crate::storage::Storage;

use super::budget::BudgetService;
use super::match_id_prefix;
use super::unit_of_work::UnitOfWork;

/// Largest amount accepted for a single transaction
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Options for listing transactions
///
/// Only one selector is applied, in this order: category, date range,
/// most recent `limit`, everything. The kind filter applies on top.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub kind: Option<TransactionType>,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Filter by date range (both ends inclusive)
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Only the most recent transactions
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only income or only expenses
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Money,
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    pub category_id: CategoryId,
    pub notes: Option<String>,
}

/// Fields to change on an existing transaction; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<DateTime<Utc>>,
    /// `Some("")` clears the notes
    pub notes: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    dispatcher: &'a EventDispatcher,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, dispatcher: &'a EventDispatcher) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Record a new transaction
    pub fn create(&self, input: NewTransaction) -> FinanceResult<Transaction> {
        let category = self.require_category(input.category_id)?;
        if category.kind() != input.kind {
            return Err(FinanceError::invalid(
                "type",
                format!(
                    "Transaction type {} does not match category type {}",
                    input.kind,
                    category.kind()
                ),
            ));
        }
        check_amount_cap(&input.amount)?;

        let mut txn = Transaction::new(
            &input.description,
            input.amount,
            input.kind,
            input.date,
            input.category_id,
            input.notes.as_deref(),
        )?;

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut txn);
        self.storage.transactions.upsert(txn.clone())?;

        if txn.is_expense() {
            self.budgets()
                .apply_expense(&mut uow, txn.category_id(), txn.date(), txn.amount())?;
        }

        uow.commit()?;

        info!(
            transaction = %txn.id(),
            category = category.name(),
            amount = %txn.amount(),
            "transaction recorded"
        );
        Ok(txn)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> FinanceResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full or short ID (`txn-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> FinanceResult<Option<Transaction>> {
        if let Ok(id) = identifier.trim().parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        match_id_prefix(
            identifier,
            "txn-",
            self.storage.transactions.get_all()?,
            |t| *t.id().as_uuid(),
        )
    }

    /// List transactions, newest first
    pub fn list(&self, query: TransactionQuery) -> FinanceResult<Vec<Transaction>> {
        let repo = &self.storage.transactions;

        let transactions = if let Some(category_id) = query.category_id {
            repo.get_by_category(category_id)?
        } else if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            repo.get_by_date_range(start_of_day(start), end_of_day(end))?
        } else if let Some(limit) = query.limit {
            repo.get_recent(limit)?
        } else {
            repo.get_all()?
        };

        Ok(match query.kind {
            Some(kind) => transactions
                .into_iter()
                .filter(|t| t.kind() == kind)
                .collect(),
            None => transactions,
        })
    }

    /// Update a transaction, moving it to another category if asked
    ///
    /// A new category must have the same kind as the transaction. Budget
    /// totals are moved from the old category and month to the new ones.
    pub fn update(&self, id: TransactionId, changes: TransactionUpdate) -> FinanceResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| FinanceError::transaction_not_found(id.to_string()))?;

        let old_category_id = txn.category_id();
        let old_date = txn.date();
        let old_amount = txn.amount().clone();

        if let Some(new_category_id) = changes.category_id {
            if new_category_id != old_category_id {
                let category = self.require_category(new_category_id)?;
                if category.kind() != txn.kind() {
                    return Err(FinanceError::invalid(
                        "category",
                        format!(
                            "New category type {} does not match transaction type {}",
                            category.kind(),
                            txn.kind()
                        ),
                    ));
                }
                txn.change_category(new_category_id)?;
            }
        }

        let description = changes
            .description
            .unwrap_or_else(|| txn.description().to_string());
        let amount = changes.amount.unwrap_or_else(|| txn.amount().clone());
        let date = changes.date.unwrap_or_else(|| txn.date());
        let notes = match changes.notes {
            Some(notes) => Some(notes),
            None => txn.notes().map(str::to_string),
        };

        check_amount_cap(&amount)?;
        txn.update_details(&description, amount, date, notes.as_deref())?;

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut txn);
        self.storage.transactions.upsert(txn.clone())?;

        if txn.is_expense() {
            let budgets = self.budgets();
            budgets.revert_expense(&mut uow, old_category_id, old_date, &old_amount)?;
            budgets.apply_expense(&mut uow, txn.category_id(), txn.date(), txn.amount())?;
        }

        uow.commit()?;

        info!(transaction = %id, amount = %txn.amount(), "transaction updated");
        Ok(txn)
    }

    /// Delete a transaction, taking it back out of its budget
    pub fn delete(&self, id: TransactionId) -> FinanceResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| FinanceError::transaction_not_found(id.to_string()))?;

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        self.storage.transactions.delete(id)?;

        if txn.is_expense() {
            self.budgets()
                .revert_expense(&mut uow, txn.category_id(), txn.date(), txn.amount())?;
        }

        uow.commit()?;

        info!(transaction = %id, "transaction deleted");
        Ok(txn)
    }

    fn budgets(&self) -> BudgetService<'a> {
        BudgetService::new(self.storage, self.dispatcher)
    }

    fn require_category(&self, id: CategoryId) -> FinanceResult<Category> {
        self.storage
            .categories
            .get(id)?
            .ok_or_else(|| FinanceError::category_not_found(id.to_string()))
    }
}

fn check_amount_cap(amount: &Money) -> FinanceResult<()> {
    if amount.amount() > MAX_AMOUNT {
        return Err(FinanceError::invalid(
            "amount",
            format!("Amount cannot exceed {}", MAX_AMOUNT),
        ));
    }
    Ok(())
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::nanoseconds(1)
}
