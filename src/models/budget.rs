//! Budget model
//!
//! A budget caps spending in one expense category for one calendar month and
//! keeps a running `spent` total. Threshold events are one-shot: they are
//! raised by the mutation that observes the status, not stored as state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{Aggregate, EntityMeta};
use super::ids::{BudgetId, CategoryId};
use super::money::Money;
use crate::error::{FinanceError, FinanceResult};
use crate::events::DomainEvent;

/// Earliest budget year
pub const MIN_YEAR: i32 = 2000;

/// Latest budget year
pub const MAX_YEAR: i32 = 2100;

/// Percentage of the limit at which a budget counts as near its limit
pub const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A monthly spending limit for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    id: BudgetId,
    category_id: CategoryId,
    limit: Money,
    year: i32,
    month: u32,
    spent: Money,
    #[serde(flatten)]
    meta: EntityMeta,
}

impl Budget {
    /// Create a budget with nothing spent, raising `BudgetCreated`
    pub fn new(category_id: CategoryId, limit: Money, year: i32, month: u32) -> FinanceResult<Self> {
        if category_id.is_nil() {
            return Err(FinanceError::invalid(
                "category",
                "Budget must have a valid category",
            ));
        }
        validate_limit(&limit)?;
        validate_period(year, month)?;

        let spent = Money::zero_in(limit.currency().clone());
        let mut budget = Self {
            id: BudgetId::new(),
            category_id,
            limit,
            year,
            month,
            spent,
            meta: EntityMeta::new(),
        };

        let event = DomainEvent::budget_created(
            budget.id,
            budget.category_id,
            budget.limit.clone(),
            budget.year,
            budget.month,
        );
        budget.meta.record(event);

        Ok(budget)
    }

    /// Change the limit, raising `BudgetLimitUpdated` followed by any status event
    ///
    /// The currency of a budget is fixed at creation.
    pub fn update_limit(&mut self, new_limit: Money) -> FinanceResult<()> {
        validate_limit(&new_limit)?;
        if !new_limit.same_currency(&self.limit) {
            return Err(FinanceError::invalid(
                "limit",
                format!(
                    "Cannot change budget currency from {} to {}",
                    self.limit.currency(),
                    new_limit.currency()
                ),
            ));
        }

        let old_limit = std::mem::replace(&mut self.limit, new_limit);
        self.meta.mark_updated();
        self.meta.record(DomainEvent::budget_limit_updated(
            self.id,
            old_limit,
            self.limit.clone(),
        ));

        self.check_budget_status();
        Ok(())
    }

    /// Add to the running total and raise a status event if warranted
    pub fn add_expense(&mut self, amount: &Money) -> FinanceResult<()> {
        self.spent = self.spent.add(amount)?;
        self.meta.mark_updated();

        self.check_budget_status();
        Ok(())
    }

    /// Take an expense back out of the running total, never going below zero
    pub fn subtract_expense(&mut self, amount: &Money) -> FinanceResult<()> {
        let spent = self.spent.subtract(amount)?;
        self.spent = if spent.is_negative() {
            Money::zero_in(self.spent.currency().clone())
        } else {
            spent
        };
        self.meta.mark_updated();
        Ok(())
    }

    /// Limit minus spent; negative once over budget
    pub fn remaining(&self) -> Money {
        Money::new(
            self.limit.amount().saturating_sub(self.spent.amount()),
            self.limit.currency().clone(),
        )
    }

    /// Spent as a percentage of the limit
    ///
    /// Saturates at `Decimal::MAX` when spending dwarfs a tiny limit.
    pub fn percentage_used(&self) -> Decimal {
        if self.limit.is_zero() {
            return Decimal::ZERO;
        }
        self.spent
            .amount()
            .checked_div(self.limit.amount())
            .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent.amount() > self.limit.amount()
    }

    pub fn is_near_limit(&self) -> bool {
        self.percentage_used() >= NEAR_LIMIT_PERCENT && !self.is_over_budget()
    }

    pub fn id(&self) -> BudgetId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn limit(&self) -> &Money {
        &self.limit
    }

    pub fn spent(&self) -> &Money {
        &self.spent
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Whether this budget covers the given category and month
    pub fn covers(&self, category_id: CategoryId, year: i32, month: u32) -> bool {
        self.category_id == category_id && self.year == year && self.month == month
    }

    /// Period label like "2025-01"
    pub fn period_label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    // Exceeded wins over near-limit; at most one event per call.
    fn check_budget_status(&mut self) {
        let event = if self.is_over_budget() {
            DomainEvent::budget_exceeded(
                self.id,
                self.category_id,
                self.limit.clone(),
                self.spent.clone(),
                self.year,
                self.month,
            )
        } else if self.is_near_limit() {
            DomainEvent::budget_near_limit(
                self.id,
                self.category_id,
                self.limit.clone(),
                self.spent.clone(),
                self.year,
                self.month,
            )
        } else {
            return;
        };

        self.meta.record(event);
    }
}

impl Aggregate for Budget {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} of {}", self.period_label(), self.spent, self.limit)
    }
}

fn validate_limit(limit: &Money) -> FinanceResult<()> {
    if !limit.is_positive() {
        return Err(FinanceError::invalid("limit", "Budget limit must be positive"));
    }
    Ok(())
}

fn validate_period(year: i32, month: u32) -> FinanceResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(FinanceError::invalid(
            "year",
            format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ));
    }
    if !(1..=12).contains(&month) {
        return Err(FinanceError::invalid("month", "Month must be between 1 and 12"));
    }
    Ok(())
}
