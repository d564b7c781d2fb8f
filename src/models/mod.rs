//! Core data models for the finance tracker
//!
//! This module contains the domain layer: the money value type, the category,
//! transaction and budget aggregates, and the metadata they share.

pub mod budget;
pub mod category;
pub mod entity;
pub mod ids;
pub mod money;
pub mod transaction;

pub use budget::Budget;
pub use category::Category;
pub use entity::{Aggregate, EntityMeta};
pub use ids::{BudgetId, CategoryId, EventId, TransactionId};
pub use money::{Currency, Money};
pub use transaction::{Transaction, TransactionType};
