//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer. Handlers print
//! their results and return errors to `main`.

pub mod audit;
pub mod budget;
pub mod category;
pub mod transaction;

pub use audit::handle_audit_command;
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::settings::Settings;
use crate::error::{FinanceError, FinanceResult};
use crate::models::{Currency, Money};

/// Parse a `YYYY-MM-DD` date as midnight UTC
pub(crate) fn parse_date(input: &str) -> FinanceResult<DateTime<Utc>> {
    let date = parse_day(input)?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

pub(crate) fn parse_day(input: &str) -> FinanceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        FinanceError::invalid("date", format!("'{}' is not a date like 2025-01-31", input))
    })
}

/// Parse a budget period: "2025-01", "current" or "last"
pub(crate) fn parse_period(input: Option<&str>) -> FinanceResult<(i32, u32)> {
    let today = Utc::now().date_naive();

    match input.map(str::trim) {
        None | Some("current") => Ok((today.year(), today.month())),
        Some("last") => {
            if today.month() == 1 {
                Ok((today.year() - 1, 12))
            } else {
                Ok((today.year(), today.month() - 1))
            }
        }
        Some(s) => {
            let invalid =
                || FinanceError::invalid("period", format!("'{}' is not a month like 2025-01", s));

            let (year, month) = s.split_once('-').ok_or_else(invalid)?;
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let month = month.parse::<u32>().map_err(|_| invalid())?;
            Ok((year, month))
        }
    }
}

/// Parse an amount in the given currency, or the default one from settings
pub(crate) fn parse_money(
    amount: &str,
    currency: Option<&str>,
    settings: &Settings,
) -> FinanceResult<Money> {
    let currency = match currency {
        Some(code) => Currency::parse(code)?,
        None => settings.currency()?,
    };
    Money::parse(amount, currency)
}
