//! Service layer for the finance tracker
//!
//! Services run the checks that need a repository round-trip (unique names,
//! category/transaction type agreement, references on delete), apply the
//! change to the aggregates, and commit through a [`UnitOfWork`] so events
//! are only published once the change is on disk.

pub mod budget;
pub mod category;
pub mod transaction;
pub mod unit_of_work;

pub use budget::BudgetService;
pub use category::{CategoryService, CategoryUpdate};
pub use transaction::{NewTransaction, TransactionQuery, TransactionService, TransactionUpdate};
pub use unit_of_work::UnitOfWork;

use uuid::Uuid;

use crate::error::{FinanceError, FinanceResult};

/// Resolve a short id such as `txn-1a2b3c4d` against a set of candidates
///
/// Returns `None` if the identifier is not a plausible id prefix or nothing
/// matches, and an error if more than one candidate matches.
pub(crate) fn match_id_prefix<T>(
    identifier: &str,
    display_prefix: &str,
    candidates: Vec<T>,
    uuid_of: impl Fn(&T) -> Uuid,
) -> FinanceResult<Option<T>> {
    let trimmed = identifier.trim();
    let prefix = trimmed
        .strip_prefix(display_prefix)
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    let plausible = prefix.len() >= 4 && prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    if !plausible {
        return Ok(None);
    }

    let mut matches = candidates
        .into_iter()
        .filter(|c| uuid_of(c).to_string().starts_with(&prefix));

    let first = matches.next();
    if matches.next().is_some() {
        return Err(FinanceError::invalid(
            "id",
            format!("'{}' matches more than one record; use more characters", identifier),
        ));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_prefix() {
        let a = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000001").unwrap();
        let b = Uuid::parse_str("1a2b9999-0000-4000-8000-000000000002").unwrap();

        let found = match_id_prefix("txn-1a2b3c", "txn-", vec![a, b], |u| *u).unwrap();
        assert_eq!(found, Some(a));

        assert!(match_id_prefix("1a2b", "txn-", vec![a, b], |u| *u).is_err());
        assert_eq!(match_id_prefix("ffff", "txn-", vec![a, b], |u| *u).unwrap(), None);
        assert_eq!(match_id_prefix("Rent", "txn-", vec![a, b], |u| *u).unwrap(), None);
    }
}
