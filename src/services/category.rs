//! Category service
//!
//! Enforces what a single category cannot check on its own: unique names and
//! that nothing still references a category being deleted.

use tracing::info;

use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::{Category, CategoryId, TransactionType};
use crate::storage::Storage;

use super::match_id_prefix;
use super::unit_of_work::UnitOfWork;

/// Fields to change on an existing category; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate<'a> {
    pub name: Option<&'a str>,
    /// `Some("")` clears the description
    pub description: Option<&'a str>,
    pub color: Option<&'a str>,
}

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
    dispatcher: &'a EventDispatcher,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage, dispatcher: &'a EventDispatcher) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Create a new category with a name no other category uses
    pub fn create(
        &self,
        name: &str,
        kind: TransactionType,
        description: Option<&str>,
        color: Option<&str>,
    ) -> FinanceResult<Category> {
        let mut category = Category::new(name, kind, description, color)?;

        if self.storage.categories.get_by_name(category.name())?.is_some() {
            return Err(FinanceError::Duplicate {
                entity_type: "Category",
                identifier: category.name().to_string(),
            });
        }

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut category);
        self.storage.categories.upsert(category.clone())?;
        uow.commit()?;

        info!(category = %category.id(), name = category.name(), %kind, "category created");
        Ok(category)
    }

    /// Get a category by ID
    pub fn get(&self, id: CategoryId) -> FinanceResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by name, full ID or short ID (`cat-1a2b3c4d`)
    ///
    /// Names win over IDs.
    pub fn find(&self, identifier: &str) -> FinanceResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_name(identifier)? {
            return Ok(Some(category));
        }

        if let Ok(id) = identifier.trim().parse::<CategoryId>() {
            return self.storage.categories.get(id);
        }

        match_id_prefix(
            identifier,
            "cat-",
            self.storage.categories.get_all()?,
            |c| *c.id().as_uuid(),
        )
    }

    /// List all categories, ordered by name
    pub fn list(&self) -> FinanceResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    /// List income or expense categories
    pub fn list_by_type(&self, kind: TransactionType) -> FinanceResult<Vec<Category>> {
        self.storage.categories.get_by_type(kind)
    }

    /// Update name, description and color
    pub fn update(&self, id: CategoryId, changes: CategoryUpdate<'_>) -> FinanceResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| FinanceError::category_not_found(id.to_string()))?;

        let name = changes.name.unwrap_or(category.name()).to_string();
        let description = match changes.description {
            Some(description) => Some(description.to_string()),
            None => category.description().map(str::to_string),
        };

        if let Some(existing) = self.storage.categories.get_by_name(&name)? {
            if existing.id() != id {
                return Err(FinanceError::Duplicate {
                    entity_type: "Category",
                    identifier: name.trim().to_string(),
                });
            }
        }

        category.update_details(&name, description.as_deref(), changes.color)?;

        let mut uow = UnitOfWork::new(self.storage, self.dispatcher);
        uow.track(&mut category);
        self.storage.categories.upsert(category.clone())?;
        uow.commit()?;

        info!(category = %id, name = category.name(), "category updated");
        Ok(category)
    }

    /// Delete a category that no transaction or budget references
    pub fn delete(&self, id: CategoryId) -> FinanceResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| FinanceError::category_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.count_by_category(id)?;
        if transactions > 0 {
            return Err(FinanceError::Conflict(format!(
                "Category '{}' has {} transaction(s); delete or move them first",
                category.name(),
                transactions
            )));
        }

        let budgets = self.storage.budgets.get_by_category(id)?;
        if !budgets.is_empty() {
            return Err(FinanceError::Conflict(format!(
                "Category '{}' has {} budget(s); delete them first",
                category.name(),
                budgets.len()
            )));
        }

        let uow = UnitOfWork::new(self.storage, self.dispatcher);
        self.storage.categories.delete(id)?;
        uow.commit()?;

        info!(category = %id, name = category.name(), "category deleted");
        Ok(category)
    }
}
