//! Storage initialization
//!
//! Handles first-run setup and the default category set

use tracing::info;

use crate::config::paths::FinancePaths;
use crate::error::FinanceError;
use crate::models::{Category, TransactionType};

use super::categories::CategoryData;
use super::file_io::write_json_atomic;

/// Categories created on first run: (name, kind, description, color)
const DEFAULT_CATEGORIES: &[(&str, TransactionType, &str, &str)] = &[
    ("Salary", TransactionType::Income, "Monthly salary and bonuses", "#10b981"),
    ("Freelance", TransactionType::Income, "Freelance work and consulting", "#059669"),
    ("Investments", TransactionType::Income, "Dividends and investment returns", "#047857"),
    ("Groceries", TransactionType::Expense, "Food and household items", "#ef4444"),
    ("Transport", TransactionType::Expense, "Gas, public transport, parking", "#dc2626"),
    ("Utilities", TransactionType::Expense, "Electricity, water, internet", "#b91c1c"),
    ("Entertainment", TransactionType::Expense, "Movies, dining out, hobbies", "#991b1b"),
    ("Healthcare", TransactionType::Expense, "Medical expenses and insurance", "#7f1d1d"),
    ("Shopping", TransactionType::Expense, "Clothes, electronics, misc items", "#450a0a"),
];

/// Initialize storage for a fresh installation
///
/// Creates the data directory and, if no categories file exists yet, the
/// default categories. Existing data is never overwritten.
pub fn initialize_storage(paths: &FinancePaths) -> Result<(), FinanceError> {
    paths.ensure_directories()?;

    if needs_initialization(paths) {
        create_default_categories(paths)?;
    }

    Ok(())
}

fn create_default_categories(paths: &FinancePaths) -> Result<(), FinanceError> {
    let categories = DEFAULT_CATEGORIES
        .iter()
        .map(|(name, kind, description, color)| {
            Category::new(name, *kind, Some(*description), Some(*color))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = categories.len(), "seeding default categories");
    write_json_atomic(paths.categories_file(), &CategoryData { categories })
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &FinancePaths) -> bool {
    !paths.categories_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_categories(paths: &FinancePaths) -> CategoryData {
        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        initialize_storage(&paths).unwrap();

        assert!(!needs_initialization(&paths));
        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_default_categories_created() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        let data = read_categories(&paths);

        assert_eq!(data.categories.len(), 9);
        let income = data
            .categories
            .iter()
            .filter(|c| c.kind() == TransactionType::Income)
            .count();
        assert_eq!(income, 3);

        let groceries = data
            .categories
            .iter()
            .find(|c| c.name() == "Groceries")
            .unwrap();
        assert_eq!(groceries.color(), "#ef4444");
        assert_eq!(groceries.description(), Some("Food and household items"));
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let custom = CategoryData {
            categories: vec![Category::new("Rent", TransactionType::Expense, None, None).unwrap()],
        };
        write_json_atomic(paths.categories_file(), &custom).unwrap();

        initialize_storage(&paths).unwrap();

        let data = read_categories(&paths);
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.categories[0].name(), "Rent");
    }
}
