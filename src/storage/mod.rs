//! Storage layer for the finance tracker
//!
//! Each repository keeps its entities in memory behind an `RwLock` and is
//! backed by one JSON file that is rewritten atomically on save.

pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod transactions;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use transactions::TransactionRepository;

use std::fmt::Display;

use tracing::debug;

use crate::config::paths::FinancePaths;
use crate::error::FinanceError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: FinancePaths,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FinancePaths) -> Result<Self, FinanceError> {
        paths.ensure_directories()?;

        Ok(Self {
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FinancePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), FinanceError> {
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        debug!(base_dir = %self.paths.base_dir().display(), "loaded all repositories");
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), FinanceError> {
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

pub(crate) fn read_lock_err(e: impl Display) -> FinanceError {
    FinanceError::Storage(format!("Failed to acquire read lock: {}", e))
}

pub(crate) fn write_lock_err(e: impl Display) -> FinanceError {
    FinanceError::Storage(format!("Failed to acquire write lock: {}", e))
}
