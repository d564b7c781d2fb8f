//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FinanceError;
use crate::models::{Category, CategoryId, TransactionType};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock_err, write_lock_err};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), FinanceError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = self.categories.write().map_err(write_lock_err)?;
        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id(), category);
        }

        Ok(())
    }

    /// Save categories to disk, sorted by name
    pub fn save(&self) -> Result<(), FinanceError> {
        let file_data = CategoryData {
            categories: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, FinanceError> {
        let categories = self.categories.read().map_err(read_lock_err)?;
        Ok(categories.get(&id).cloned())
    }

    /// Get all categories, ordered by name
    pub fn get_all(&self) -> Result<Vec<Category>, FinanceError> {
        let categories = self.categories.read().map_err(read_lock_err)?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by_key(|c| c.name().to_lowercase());
        Ok(list)
    }

    /// Get a category by name (case-insensitive, surrounding whitespace ignored)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Category>, FinanceError> {
        let categories = self.categories.read().map_err(read_lock_err)?;

        let name = name.trim().to_lowercase();
        Ok(categories
            .values()
            .find(|c| c.name().to_lowercase() == name)
            .cloned())
    }

    /// Get all categories of one kind, ordered by name
    pub fn get_by_type(&self, kind: TransactionType) -> Result<Vec<Category>, FinanceError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|c| c.kind() == kind)
            .collect())
    }

    /// Insert or update a category
    pub fn upsert(&self, category: Category) -> Result<(), FinanceError> {
        let mut categories = self.categories.write().map_err(write_lock_err)?;
        categories.insert(category.id(), category);
        Ok(())
    }

    /// Delete a category, returning whether it existed
    pub fn delete(&self, id: CategoryId) -> Result<bool, FinanceError> {
        let mut categories = self.categories.write().map_err(write_lock_err)?;
        Ok(categories.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, FinanceError> {
        let categories = self.categories.read().map_err(read_lock_err)?;
        Ok(categories.len())
    }
}
