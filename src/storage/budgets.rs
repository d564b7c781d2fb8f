//! Budget repository for JSON storage
//!
//! Manages loading and saving budgets to budgets.json. A period index keyed by
//! (category, year, month) keeps at most one budget per category and month.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FinanceError;
use crate::models::{Aggregate, Budget, BudgetId, CategoryId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock_err, write_lock_err};

/// Serializable budget data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    budgets: Vec<Budget>,
}

/// Composite key for the one-budget-per-period rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodKey {
    pub category_id: CategoryId,
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(category_id: CategoryId, year: i32, month: u32) -> Self {
        Self {
            category_id,
            year,
            month,
        }
    }

    fn of(budget: &Budget) -> Self {
        Self::new(budget.category_id(), budget.year(), budget.month())
    }
}

/// Repository for budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    budgets: RwLock<HashMap<BudgetId, Budget>>,
    by_period: RwLock<HashMap<PeriodKey, BudgetId>>,
}

impl BudgetRepository {
    /// Create a new budget repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            budgets: RwLock::new(HashMap::new()),
            by_period: RwLock::new(HashMap::new()),
        }
    }

    /// Load budgets from disk and rebuild the period index
    pub fn load(&self) -> Result<(), FinanceError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut budgets = self.budgets.write().map_err(write_lock_err)?;
        let mut by_period = self.by_period.write().map_err(write_lock_err)?;

        budgets.clear();
        by_period.clear();

        for budget in file_data.budgets {
            let key = PeriodKey::of(&budget);
            if by_period.insert(key, budget.id()).is_some() {
                return Err(FinanceError::Storage(format!(
                    "{} holds two budgets for category {} in {}",
                    self.path.display(),
                    budget.category_id(),
                    budget.period_label()
                )));
            }
            budgets.insert(budget.id(), budget);
        }

        Ok(())
    }

    /// Save budgets to disk, ordered by period
    pub fn save(&self) -> Result<(), FinanceError> {
        let file_data = BudgetData {
            budgets: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> Result<Option<Budget>, FinanceError> {
        let budgets = self.budgets.read().map_err(read_lock_err)?;
        Ok(budgets.get(&id).cloned())
    }

    /// Get all budgets, newest period first
    pub fn get_all(&self) -> Result<Vec<Budget>, FinanceError> {
        let budgets = self.budgets.read().map_err(read_lock_err)?;

        let mut list: Vec<_> = budgets.values().cloned().collect();
        list.sort_by(|a, b| {
            (b.year(), b.month())
                .cmp(&(a.year(), a.month()))
                .then(a.created_at().cmp(&b.created_at()))
        });
        Ok(list)
    }

    /// Get the budget for a category and month
    pub fn get_by_category_and_period(
        &self,
        category_id: CategoryId,
        year: i32,
        month: u32,
    ) -> Result<Option<Budget>, FinanceError> {
        let budgets = self.budgets.read().map_err(read_lock_err)?;
        let by_period = self.by_period.read().map_err(read_lock_err)?;

        Ok(by_period
            .get(&PeriodKey::new(category_id, year, month))
            .and_then(|id| budgets.get(id).cloned()))
    }

    /// Get every budget for a month
    pub fn get_by_period(&self, year: i32, month: u32) -> Result<Vec<Budget>, FinanceError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.year() == year && b.month() == month)
            .collect())
    }

    /// Get every budget for a category, newest period first
    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Budget>, FinanceError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| b.category_id() == category_id)
            .collect())
    }

    /// Insert or update a budget
    ///
    /// Fails with `Duplicate` if a different budget already covers the same
    /// category and month.
    pub fn upsert(&self, budget: Budget) -> Result<(), FinanceError> {
        let mut budgets = self.budgets.write().map_err(write_lock_err)?;
        let mut by_period = self.by_period.write().map_err(write_lock_err)?;

        let key = PeriodKey::of(&budget);
        if let Some(existing) = by_period.get(&key) {
            if *existing != budget.id() {
                return Err(FinanceError::Duplicate {
                    entity_type: "Budget",
                    identifier: budget.period_label(),
                });
            }
        }

        if let Some(old) = budgets.get(&budget.id()) {
            by_period.remove(&PeriodKey::of(old));
        }

        by_period.insert(key, budget.id());
        budgets.insert(budget.id(), budget);
        Ok(())
    }

    /// Delete a budget, returning whether it existed
    pub fn delete(&self, id: BudgetId) -> Result<bool, FinanceError> {
        let mut budgets = self.budgets.write().map_err(write_lock_err)?;
        let mut by_period = self.by_period.write().map_err(write_lock_err)?;

        match budgets.remove(&id) {
            Some(budget) => {
                by_period.remove(&PeriodKey::of(&budget));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> Result<usize, FinanceError> {
        let budgets = self.budgets.read().map_err(read_lock_err)?;
        Ok(budgets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, BudgetRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        (temp_dir, repo)
    }

    fn budget(category_id: CategoryId, year: i32, month: u32) -> Budget {
        Budget::new(category_id, Money::usd(dec!(300)), year, month).unwrap()
    }

    #[test]
    fn test_upsert_and_lookup_by_period() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        let jan = budget(category_id, 2025, 1);
        let id = jan.id();

        repo.upsert(jan).unwrap();

        let found = repo
            .get_by_category_and_period(category_id, 2025, 1)
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), id);
        assert!(repo
            .get_by_category_and_period(category_id, 2025, 2)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_second_budget_for_same_period_rejected() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();

        repo.upsert(budget(category_id, 2025, 1)).unwrap();
        let err = repo.upsert(budget(category_id, 2025, 1)).unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_update_same_budget_allowed() {
        let (_temp_dir, repo) = create_test_repo();
        let mut jan = budget(CategoryId::new(), 2025, 1);
        repo.upsert(jan.clone()).unwrap();

        jan.add_expense(&Money::usd(dec!(20))).unwrap();
        repo.upsert(jan.clone()).unwrap();

        assert_eq!(
            repo.get(jan.id()).unwrap().unwrap().spent().amount(),
            dec!(20)
        );
    }

    #[test]
    fn test_period_and_category_queries() {
        let (_temp_dir, repo) = create_test_repo();
        let food = CategoryId::new();
        let rent = CategoryId::new();

        repo.upsert(budget(food, 2025, 1)).unwrap();
        repo.upsert(budget(food, 2025, 2)).unwrap();
        repo.upsert(budget(rent, 2025, 1)).unwrap();

        assert_eq!(repo.get_by_period(2025, 1).unwrap().len(), 2);

        let food_budgets = repo.get_by_category(food).unwrap();
        assert_eq!(food_budgets.len(), 2);
        assert_eq!(food_budgets[0].month(), 2);
    }

    #[test]
    fn test_delete_frees_period() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        let jan = budget(category_id, 2025, 1);
        let id = jan.id();
        repo.upsert(jan).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        repo.upsert(budget(category_id, 2025, 1)).unwrap();
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        repo.upsert(budget(category_id, 2024, 12)).unwrap();
        repo.save().unwrap();

        let reloaded = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        reloaded.load().unwrap();
        assert!(reloaded
            .get_by_category_and_period(category_id, 2024, 12)
            .unwrap()
            .is_some());
    }
}
