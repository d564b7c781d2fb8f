//! Budget service
//!
//! Creates and adjusts monthly budgets, and keeps each budget's running
//! `spent` total in step with the expense transactions recorded against its
//! category and month.

use chrono::{DateTime, Datelike, Utc};
use tracing::{info, warn};

use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::{Budget, BudgetId, CategoryId, Money, TransactionType};
use crate::storage::Storage;

use super::match_id_prefix;
use super::unit_of_work::UnitOfWork;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
    dispatcher: &'a EventDispatcher,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage, dispatcher: &'a EventDispatcher) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Create a budget for an expense category and month
    ///
    /// Expenses already recorded for that category and month (in the budget's
    /// currency) are counted towards the new budget straight away.
    pub fn create(
        &self,
        category_id: CategoryId,
        limit: Money,
        year: i32,
        month: u32,
    ) -> FinanceResult<Budget> {
        let category = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| FinanceError::category_not_found(category_id.to_string()))?;

        if category.kind() != TransactionType::Expense {
            return Err(FinanceError::invalid(
                "category",
                format!(
                    "Budgets can only be set on expense categories; '{}' is {}",
                    category.name(),
                    category.kind()
                ),
            ));
        }

        let mut budget = Budget::new(category_id, limit, year, month)?;

        if self
            .storage
            .budgets
            .get_by_category_and_period(category_id, year, month)?
            .is_some()
        {
            return Err(FinanceError::Duplicate {
                entity_type: "Budget",
                identifier: format!("{} {}", category.name(), budget.period_label()),
            });
        }

        let already_spent = self.spent_so_far(&budget)?;
        if already_spent.is_positive() {
            budget.add_expense(&already_spent)?;
        }

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut budget);
        self.storage.budgets.upsert(budget.clone())?;
        uow.commit()?;

        info!(
            budget = %budget.id(),
            category = category.name(),
            period = %budget.period_label(),
            limit = %budget.limit(),
            "budget created"
        );
        Ok(budget)
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> FinanceResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    /// Find a budget by full or short ID (`bud-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> FinanceResult<Option<Budget>> {
        if let Ok(id) = identifier.trim().parse::<BudgetId>() {
            return self.storage.budgets.get(id);
        }

        match_id_prefix(identifier, "bud-", self.storage.budgets.get_all()?, |b| {
            *b.id().as_uuid()
        })
    }

    /// The budget for a category and month, if one exists
    pub fn for_category_and_period(
        &self,
        category_id: CategoryId,
        year: i32,
        month: u32,
    ) -> FinanceResult<Option<Budget>> {
        self.storage
            .budgets
            .get_by_category_and_period(category_id, year, month)
    }

    /// Every budget for a month
    pub fn for_period(&self, year: i32, month: u32) -> FinanceResult<Vec<Budget>> {
        self.storage.budgets.get_by_period(year, month)
    }

    /// Every budget for a category, newest month first
    pub fn for_category(&self, category_id: CategoryId) -> FinanceResult<Vec<Budget>> {
        self.storage.budgets.get_by_category(category_id)
    }

    /// All budgets, newest month first
    pub fn list(&self) -> FinanceResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    /// Change a budget's limit
    pub fn update_limit(&self, id: BudgetId, new_limit: Money) -> FinanceResult<Budget> {
        let mut budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| FinanceError::budget_not_found(id.to_string()))?;

        budget.update_limit(new_limit)?;

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut budget);
        self.storage.budgets.upsert(budget.clone())?;
        uow.commit()?;

        info!(budget = %id, limit = %budget.limit(), "budget limit updated");
        Ok(budget)
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> FinanceResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| FinanceError::budget_not_found(id.to_string()))?;

        let uow = UnitOfWork::new(self.storage, self.dispatcher);
        self.storage.budgets.delete(id)?;
        uow.commit()?;

        info!(budget = %id, period = %budget.period_label(), "budget deleted");
        Ok(budget)
    }

    /// Count an expense against the budget covering its category and month
    ///
    /// Returns the updated budget, or `None` when no budget applies.
    pub(crate) fn apply_expense(
        &self,
        uow: &mut UnitOfWork<'_>,
        category_id: CategoryId,
        date: DateTime<Utc>,
        amount: &Money,
    ) -> FinanceResult<Option<Budget>> {
        self.adjust(uow, category_id, date, amount, Budget::add_expense)
    }

    /// Take an expense back out of the budget covering its category and month
    pub(crate) fn revert_expense(
        &self,
        uow: &mut UnitOfWork<'_>,
        category_id: CategoryId,
        date: DateTime<Utc>,
        amount: &Money,
    ) -> FinanceResult<Option<Budget>> {
        self.adjust(uow, category_id, date, amount, Budget::subtract_expense)
    }

    fn adjust(
        &self,
        uow: &mut UnitOfWork<'_>,
        category_id: CategoryId,
        date: DateTime<Utc>,
        amount: &Money,
        apply: fn(&mut Budget, &Money) -> FinanceResult<()>,
    ) -> FinanceResult<Option<Budget>> {
        let Some(mut budget) = self.storage.budgets.get_by_category_and_period(
            category_id,
            date.year(),
            date.month(),
        )?
        else {
            return Ok(None);
        };

        if !budget.limit().same_currency(amount) {
            warn!(
                budget = %budget.id(),
                budget_currency = %budget.limit().currency(),
                expense_currency = %amount.currency(),
                "expense currency differs from budget, not counted"
            );
            return Ok(None);
        }

        apply(&mut budget, amount)?;
        uow.track(&mut budget);
        self.storage.budgets.upsert(budget.clone())?;
        Ok(Some(budget))
    }

    fn spent_so_far(&self, budget: &Budget) -> FinanceResult<Money> {
        let mut total = Money::zero_in(budget.limit().currency().clone());

        for txn in self.storage.transactions.get_by_category(budget.category_id())? {
            let date = txn.date();
            if txn.is_expense()
                && date.year() == budget.year()
                && date.month() == budget.month()
                && txn.amount().same_currency(&total)
            {
                total = total.add(txn.amount())?;
            }
        }

        Ok(total)
    }
}
