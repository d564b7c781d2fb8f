//! Transaction CLI commands

use std::collections::HashMap;

use chrono::Utc;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_list};
use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::{CategoryId, Transaction, TransactionType};
use crate::services::{
    CategoryService, NewTransaction, TransactionQuery, TransactionService, TransactionUpdate,
};
use crate::storage::Storage;

use super::{parse_date, parse_day, parse_money};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions, newest first
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// First day to include (YYYY-MM-DD), requires --to
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last day to include (YYYY-MM-DD), requires --from
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only income or only expenses
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// Show every transaction
        #[arg(long, conflicts_with = "limit")]
        all: bool,
    },

    /// Record a transaction
    Add {
        /// What the money was for
        description: String,
        /// Amount (e.g. "12.50"), always positive
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// Income or expense (defaults to the category's type)
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// Transaction date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Currency code, defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show transaction details
    Show {
        /// Transaction ID (short form accepted)
        transaction: String,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID (short form accepted)
        transaction: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// Currency of the new amount
        #[arg(long, requires = "amount")]
        currency: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New notes (empty string clears them)
        #[arg(short, long)]
        notes: Option<String>,
        /// Move to another category of the same type
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID (short form accepted)
        transaction: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    dispatcher: &EventDispatcher,
    settings: &Settings,
    cmd: TransactionCommands,
) -> FinanceResult<()> {
    let service = TransactionService::new(storage, dispatcher);
    let categories = CategoryService::new(storage, dispatcher);

    match cmd {
        TransactionCommands::List {
            category,
            from,
            to,
            limit,
            kind,
            all,
        } => {
            let mut query = TransactionQuery::new();

            if let Some(category) = category {
                let cat = categories
                    .find(&category)?
                    .ok_or_else(|| FinanceError::category_not_found(&category))?;
                query = query.category(cat.id());
            }
            if let (Some(from), Some(to)) = (from, to) {
                query = query.date_range(parse_day(&from)?, parse_day(&to)?);
            }
            if !all {
                query = query.limit(limit.unwrap_or(settings.recent_limit));
            }
            if let Some(kind) = kind {
                query = query.kind(kind);
            }

            let transactions = service.list(query)?;
            print!(
                "{}",
                format_transaction_list(
                    &transactions,
                    &category_names(&categories)?,
                    &settings.date_format
                )
            );
        }

        TransactionCommands::Add {
            description,
            amount,
            category,
            kind,
            date,
            notes,
            currency,
        } => {
            let cat = categories
                .find(&category)?
                .ok_or_else(|| FinanceError::category_not_found(&category))?;

            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Utc::now(),
            };

            let txn = service.create(NewTransaction {
                description,
                amount: parse_money(&amount, currency.as_deref(), settings)?,
                kind: kind.unwrap_or(cat.kind()),
                date,
                category_id: cat.id(),
                notes,
            })?;

            println!("Recorded {} '{}': {}", txn.kind(), txn.description(), txn.amount());
            println!("  Category: {}", cat.name());
            println!("  ID:       {}", txn.id());
            print_budget_status(storage, &txn)?;
        }

        TransactionCommands::Show { transaction } => {
            let txn = find(&service, &transaction)?;
            let category = categories.get(txn.category_id())?;
            print!(
                "{}",
                format_transaction_details(
                    &txn,
                    category.as_ref().map(|c| c.name()),
                    &settings.date_format
                )
            );
        }

        TransactionCommands::Edit {
            transaction,
            description,
            amount,
            currency,
            date,
            notes,
            category,
        } => {
            let txn = find(&service, &transaction)?;

            if description.is_none()
                && amount.is_none()
                && date.is_none()
                && notes.is_none()
                && category.is_none()
            {
                println!(
                    "No changes specified. Use --description, --amount, --date, --notes, or --category."
                );
                return Ok(());
            }

            let category_id = match category {
                Some(category) => Some(
                    categories
                        .find(&category)?
                        .ok_or_else(|| FinanceError::category_not_found(&category))?
                        .id(),
                ),
                None => None,
            };

            let amount = match amount {
                Some(amount) => {
                    let currency = currency
                        .as_deref()
                        .unwrap_or_else(|| txn.amount().currency().code());
                    Some(parse_money(&amount, Some(currency), settings)?)
                }
                None => None,
            };

            let updated = service.update(
                txn.id(),
                TransactionUpdate {
                    description,
                    amount,
                    date: date.as_deref().map(parse_date).transpose()?,
                    notes,
                    category_id,
                },
            )?;

            println!("Updated transaction: {}", updated.id());
            print_budget_status(storage, &updated)?;
        }

        TransactionCommands::Delete { transaction } => {
            let txn = find(&service, &transaction)?;
            let deleted = service.delete(txn.id())?;
            println!(
                "Deleted transaction: {} '{}' ({})",
                deleted.id(),
                deleted.description(),
                deleted.amount()
            );
        }
    }

    Ok(())
}

fn find(service: &TransactionService<'_>, identifier: &str) -> FinanceResult<Transaction> {
    service
        .find(identifier)?
        .ok_or_else(|| FinanceError::transaction_not_found(identifier))
}

pub(crate) fn category_names(
    categories: &CategoryService<'_>,
) -> FinanceResult<HashMap<CategoryId, String>> {
    Ok(categories
        .list()?
        .into_iter()
        .map(|c| (c.id(), c.name().to_string()))
        .collect())
}

fn print_budget_status(storage: &Storage, txn: &Transaction) -> FinanceResult<()> {
    use chrono::Datelike;

    if !txn.is_expense() {
        return Ok(());
    }

    let date = txn.date();
    if let Some(budget) =
        storage
            .budgets
            .get_by_category_and_period(txn.category_id(), date.year(), date.month())?
    {
        if budget.is_over_budget() {
            println!(
                "  Budget {} exceeded: {} spent of {}",
                budget.period_label(),
                budget.spent(),
                budget.limit()
            );
        } else if budget.is_near_limit() {
            println!(
                "  Budget {} nearly used: {} remaining",
                budget.period_label(),
                budget.remaining()
            );
        }
    }

    Ok(())
}
