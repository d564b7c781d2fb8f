//! Budget CLI commands
//!
//! Monthly spending limits per expense category.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::budget::{format_budget_details, format_budget_list};
use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::Budget;
use crate::services::{BudgetService, CategoryService};
use crate::storage::Storage;

use super::transaction::category_names;
use super::{parse_money, parse_period};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// List budgets
    List {
        /// Only this month ("2025-01", "current", "last")
        #[arg(short, long)]
        period: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Create a budget for a category and month
    Create {
        /// Expense category name or ID
        category: String,
        /// Spending limit (e.g. "400")
        limit: String,
        /// Month ("2025-01", "current", "last"), defaults to the current one
        #[arg(short, long)]
        period: Option<String>,
        /// Currency code, defaults to the configured currency
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show budget details
    Show {
        /// Budget ID (short form accepted)
        budget: String,
    },

    /// Change a budget's limit
    #[command(name = "set-limit")]
    SetLimit {
        /// Budget ID (short form accepted)
        budget: String,
        /// New limit, in the budget's currency
        limit: String,
    },

    /// Delete a budget
    Delete {
        /// Budget ID (short form accepted)
        budget: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    dispatcher: &EventDispatcher,
    settings: &Settings,
    cmd: BudgetCommands,
) -> FinanceResult<()> {
    let service = BudgetService::new(storage, dispatcher);
    let categories = CategoryService::new(storage, dispatcher);

    match cmd {
        BudgetCommands::List { period, category } => {
            let budgets = match (period, category) {
                (Some(period), Some(category)) => {
                    let (year, month) = parse_period(Some(&period))?;
                    let cat = categories
                        .find(&category)?
                        .ok_or_else(|| FinanceError::category_not_found(&category))?;
                    service
                        .for_category_and_period(cat.id(), year, month)?
                        .into_iter()
                        .collect()
                }
                (Some(period), None) => {
                    let (year, month) = parse_period(Some(&period))?;
                    service.for_period(year, month)?
                }
                (None, Some(category)) => {
                    let cat = categories
                        .find(&category)?
                        .ok_or_else(|| FinanceError::category_not_found(&category))?;
                    service.for_category(cat.id())?
                }
                (None, None) => service.list()?,
            };

            print!("{}", format_budget_list(&budgets, &category_names(&categories)?));
        }

        BudgetCommands::Create {
            category,
            limit,
            period,
            currency,
        } => {
            let cat = categories
                .find(&category)?
                .ok_or_else(|| FinanceError::category_not_found(&category))?;
            let (year, month) = parse_period(period.as_deref())?;
            let limit = parse_money(&limit, currency.as_deref(), settings)?;

            let budget = service.create(cat.id(), limit, year, month)?;
            println!(
                "Created budget for {} ({}): {}",
                cat.name(),
                budget.period_label(),
                budget.limit()
            );
            println!("  ID:    {}", budget.id());
            if !budget.spent().is_zero() {
                println!("  Spent: {}", budget.spent());
            }
        }

        BudgetCommands::Show { budget } => {
            let budget = find(&service, &budget)?;
            let category = categories.get(budget.category_id())?;
            print!(
                "{}",
                format_budget_details(&budget, category.as_ref().map(|c| c.name()))
            );
        }

        BudgetCommands::SetLimit { budget, limit } => {
            let budget = find(&service, &budget)?;
            let new_limit = parse_money(&limit, Some(budget.limit().currency().code()), settings)?;
            let old_limit = budget.limit().clone();

            let updated = service.update_limit(budget.id(), new_limit)?;
            println!(
                "Updated budget {}: {} -> {}",
                updated.period_label(),
                old_limit,
                updated.limit()
            );
        }

        BudgetCommands::Delete { budget } => {
            let budget = find(&service, &budget)?;
            let deleted = service.delete(budget.id())?;
            println!("Deleted budget: {} ({})", deleted.id(), deleted.period_label());
        }
    }

    Ok(())
}

fn find(service: &BudgetService<'_>, identifier: &str) -> FinanceResult<Budget> {
    service
        .find(identifier)?
        .ok_or_else(|| FinanceError::budget_not_found(identifier))
}
