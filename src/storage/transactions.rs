//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::FinanceError;
use crate::models::{Aggregate, CategoryId, Transaction, TransactionId, TransactionType};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock_err, write_lock_err};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with a category index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the category index
    pub fn load(&self) -> Result<(), FinanceError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(write_lock_err)?;
        let mut by_category = self.by_category.write().map_err(write_lock_err)?;

        data.clear();
        by_category.clear();

        for txn in file_data.transactions {
            by_category
                .entry(txn.category_id())
                .or_default()
                .push(txn.id());
            data.insert(txn.id(), txn);
        }

        Ok(())
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> Result<(), FinanceError> {
        let file_data = TransactionData {
            transactions: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, FinanceError> {
        let data = self.data.read().map_err(read_lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, FinanceError> {
        let data = self.data.read().map_err(read_lock_err)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    /// Get transactions for a category, newest first
    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Transaction>, FinanceError> {
        let data = self.data.read().map_err(read_lock_err)?;
        let by_category = self.by_category.read().map_err(read_lock_err)?;

        let ids = by_category
            .get(&category_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    /// Get transactions dated within `[start, end]`
    pub fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, FinanceError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.date() >= start && t.date() <= end)
            .collect())
    }

    /// Get all income or all expense transactions
    pub fn get_by_type(&self, kind: TransactionType) -> Result<Vec<Transaction>, FinanceError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.kind() == kind)
            .collect())
    }

    /// Get the `count` newest transactions
    pub fn get_recent(&self, count: usize) -> Result<Vec<Transaction>, FinanceError> {
        let mut transactions = self.get_all()?;
        transactions.truncate(count);
        Ok(transactions)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), FinanceError> {
        let mut data = self.data.write().map_err(write_lock_err)?;
        let mut by_category = self.by_category.write().map_err(write_lock_err)?;

        if let Some(old) = data.get(&txn.id()) {
            if let Some(ids) = by_category.get_mut(&old.category_id()) {
                ids.retain(|&id| id != txn.id());
            }
        }

        by_category
            .entry(txn.category_id())
            .or_default()
            .push(txn.id());
        data.insert(txn.id(), txn);
        Ok(())
    }

    /// Delete a transaction, returning whether it existed
    pub fn delete(&self, id: TransactionId) -> Result<bool, FinanceError> {
        let mut data = self.data.write().map_err(write_lock_err)?;
        let mut by_category = self.by_category.write().map_err(write_lock_err)?;

        match data.remove(&id) {
            Some(txn) => {
                if let Some(ids) = by_category.get_mut(&txn.category_id()) {
                    ids.retain(|&tid| tid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of transactions referencing a category
    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, FinanceError> {
        let by_category = self.by_category.read().map_err(read_lock_err)?;
        Ok(by_category.get(&category_id).map_or(0, Vec::len))
    }

    pub fn count(&self) -> Result<usize, FinanceError> {
        let data = self.data.read().map_err(read_lock_err)?;
        Ok(data.len())
    }
}

fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date()
            .cmp(&a.date())
            .then(b.created_at().cmp(&a.created_at()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn txn(category_id: CategoryId, days_ago: i64, kind: TransactionType) -> Transaction {
        Transaction::new(
            &format!("Entry from {} days ago", days_ago),
            Money::usd(dec!(25)),
            kind,
            Utc::now() - Duration::days(days_ago),
            category_id,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let t = txn(CategoryId::new(), 1, TransactionType::Expense);
        let id = t.id();

        repo.upsert(t).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.amount(), &Money::usd(dec!(25)));
    }

    #[test]
    fn test_category_index_follows_category_change() {
        let (_temp_dir, repo) = create_test_repo();
        let food = CategoryId::new();
        let fun = CategoryId::new();
        let mut t = txn(food, 1, TransactionType::Expense);
        repo.upsert(t.clone()).unwrap();
        assert_eq!(repo.count_by_category(food).unwrap(), 1);

        t.change_category(fun).unwrap();
        repo.upsert(t).unwrap();

        assert_eq!(repo.count_by_category(food).unwrap(), 0);
        assert_eq!(repo.get_by_category(fun).unwrap().len(), 1);
    }

    #[test]
    fn test_newest_first_and_recent() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        for days_ago in [5, 1, 3] {
            repo.upsert(txn(category_id, days_ago, TransactionType::Expense))
                .unwrap();
        }

        let all = repo.get_all().unwrap();
        assert!(all[0].date() > all[1].date());
        assert!(all[1].date() > all[2].date());

        let recent = repo.get_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id(), all[0].id());
    }

    #[test]
    fn test_date_range_and_type_queries() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        repo.upsert(txn(category_id, 10, TransactionType::Income))
            .unwrap();
        repo.upsert(txn(category_id, 2, TransactionType::Expense))
            .unwrap();

        let range = repo
            .get_by_date_range(Utc::now() - Duration::days(5), Utc::now())
            .unwrap();
        assert_eq!(range.len(), 1);

        assert_eq!(repo.get_by_type(TransactionType::Income).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        repo.upsert(txn(category_id, 1, TransactionType::Expense))
            .unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count_by_category(category_id).unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let category_id = CategoryId::new();
        let t = txn(category_id, 1, TransactionType::Expense);
        let id = t.id();
        repo.upsert(t).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count_by_category(category_id).unwrap(), 0);
    }
}
