//! Category model
//!
//! Categories classify transactions as income or expense. A category's kind is
//! fixed at creation; name uniqueness is checked by the category service, not
//! here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{Aggregate, EntityMeta};
use super::ids::CategoryId;
use super::transaction::TransactionType;
use crate::error::{FinanceError, FinanceResult};

/// Longest allowed category name, in characters
pub const MAX_NAME_LEN: usize = 50;

/// Longest allowed category description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Color given to categories created without one
pub const DEFAULT_COLOR: &str = "#6366f1";

/// A named income or expense classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    kind: TransactionType,
    color: String,
    #[serde(flatten)]
    meta: EntityMeta,
}

impl Category {
    /// Create a new category
    pub fn new(
        name: &str,
        kind: TransactionType,
        description: Option<&str>,
        color: Option<&str>,
    ) -> FinanceResult<Self> {
        let name = validate_name(name)?;
        let description = validate_description(description)?;
        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => validate_color(c)?,
            None => DEFAULT_COLOR.to_string(),
        };

        Ok(Self {
            id: CategoryId::new(),
            name,
            description,
            kind,
            color,
            meta: EntityMeta::new(),
        })
    }

    /// Replace name and description; the color only changes when one is given
    pub fn update_details(
        &mut self,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> FinanceResult<()> {
        let name = validate_name(name)?;
        let description = validate_description(description)?;
        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => Some(validate_color(c)?),
            None => None,
        };

        self.name = name;
        self.description = description;
        if let Some(color) = color {
            self.color = color;
        }

        self.meta.mark_updated();
        Ok(())
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl Aggregate for Category {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_name(name: &str) -> FinanceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FinanceError::invalid("name", "Category name cannot be empty"));
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(FinanceError::invalid(
            "name",
            format!(
                "Category name too long ({} chars, max {})",
                len, MAX_NAME_LEN
            ),
        ));
    }

    Ok(name.to_string())
}

fn validate_description(description: Option<&str>) -> FinanceResult<Option<String>> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(FinanceError::invalid(
            "description",
            format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LEN),
        ));
    }

    Ok(Some(description.to_string()))
}

// #RRGGBB
fn validate_color(color: &str) -> FinanceResult<String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(FinanceError::invalid(
            "color",
            format!("'{}' is not a hex color like #ff6b6b", color),
        ));
    }

    Ok(color.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let category = Category::new(
            "  Groceries ",
            TransactionType::Expense,
            Some(" Food and household items "),
            None,
        )
        .unwrap();

        assert_eq!(category.name(), "Groceries");
        assert_eq!(category.description(), Some("Food and household items"));
        assert_eq!(category.kind(), TransactionType::Expense);
        assert_eq!(category.color(), DEFAULT_COLOR);
        assert!(category.updated_at().is_none());
        assert!(category.domain_events().is_empty());
    }

    #[test]
    fn test_name_validation() {
        let err = Category::new("   ", TransactionType::Income, None, None).unwrap_err();
        assert!(err.is_invalid_argument());

        let too_long = "a".repeat(51);
        assert!(Category::new(&too_long, TransactionType::Income, None, None).is_err());

        let exactly_max = "a".repeat(50);
        assert!(Category::new(&exactly_max, TransactionType::Income, None, None).is_ok());

        // Trimmed before the length check
        let padded = format!("  {}  ", "b".repeat(50));
        assert!(Category::new(&padded, TransactionType::Income, None, None).is_ok());
    }

    #[test]
    fn test_description_and_color_validation() {
        let long = "d".repeat(201);
        assert!(Category::new("Rent", TransactionType::Expense, Some(&long), None).is_err());
        assert!(Category::new("Rent", TransactionType::Expense, None, Some("red")).is_err());
        assert!(Category::new("Rent", TransactionType::Expense, None, Some("#12345g")).is_err());

        let category =
            Category::new("Rent", TransactionType::Expense, None, Some("#EF4444")).unwrap();
        assert_eq!(category.color(), "#EF4444");
    }

    #[test]
    fn test_update_details_keeps_color_when_omitted() {
        let mut category =
            Category::new("Transport", TransactionType::Expense, None, Some("#dc2626")).unwrap();

        category
            .update_details("Travel", Some("Trains and buses"), None)
            .unwrap();
        assert_eq!(category.name(), "Travel");
        assert_eq!(category.description(), Some("Trains and buses"));
        assert_eq!(category.color(), "#dc2626");
        assert!(category.updated_at().is_some());

        category.update_details("Travel", None, Some("#000000")).unwrap();
        assert_eq!(category.color(), "#000000");
        assert!(category.description().is_none());
    }

    #[test]
    fn test_update_details_rejects_empty_name() {
        let mut category = Category::new("Salary", TransactionType::Income, None, None).unwrap();
        assert!(category.update_details("", None, None).is_err());
        assert_eq!(category.name(), "Salary");
        assert_eq!(category.kind(), TransactionType::Income);
    }

    #[test]
    fn test_serialization() {
        let category = Category::new("Salary", TransactionType::Income, None, None).unwrap();
        let json = serde_json::to_string(&category).unwrap();
        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(category.id(), deserialized.id());
        assert_eq!(category.name(), deserialized.name());
        assert_eq!(category.created_at(), deserialized.created_at());
    }
}
