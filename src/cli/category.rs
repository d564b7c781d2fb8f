//! Category CLI commands

use clap::Subcommand;

use crate::display::category::{format_category_details, format_category_list};
use crate::error::{FinanceError, FinanceResult};
use crate::events::EventDispatcher;
use crate::models::TransactionType;
use crate::services::{CategoryService, CategoryUpdate};
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only income or only expense categories
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
    },

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Income or expense
        #[arg(short = 't', long = "type")]
        kind: TransactionType,
        /// Short description
        #[arg(short, long)]
        description: Option<String>,
        /// Hex color, e.g. "#ef4444"
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,
        /// New hex color
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a category that nothing references
    Delete {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    dispatcher: &EventDispatcher,
    cmd: CategoryCommands,
) -> FinanceResult<()> {
    let service = CategoryService::new(storage, dispatcher);

    match cmd {
        CategoryCommands::List { kind } => {
            let categories = match kind {
                Some(kind) => service.list_by_type(kind)?,
                None => service.list()?,
            };
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Create {
            name,
            kind,
            description,
            color,
        } => {
            let category =
                service.create(&name, kind, description.as_deref(), color.as_deref())?;
            println!("Created category: {}", category.name());
            println!("  Type: {}", category.kind());
            println!("  ID:   {}", category.id());
        }

        CategoryCommands::Show { category } => {
            let cat = service
                .find(&category)?
                .ok_or_else(|| FinanceError::category_not_found(&category))?;

            let count = storage.transactions.count_by_category(cat.id())?;
            print!("{}", format_category_details(&cat, count));
        }

        CategoryCommands::Edit {
            category,
            name,
            description,
            color,
        } => {
            let cat = service
                .find(&category)?
                .ok_or_else(|| FinanceError::category_not_found(&category))?;

            if name.is_none() && description.is_none() && color.is_none() {
                println!("No changes specified. Use --name, --description, or --color.");
                return Ok(());
            }

            let updated = service.update(
                cat.id(),
                CategoryUpdate {
                    name: name.as_deref(),
                    description: description.as_deref(),
                    color: color.as_deref(),
                },
            )?;
            println!("Updated category: {}", updated.name());
        }

        CategoryCommands::Delete { category } => {
            let cat = service
                .find(&category)?
                .ok_or_else(|| FinanceError::category_not_found(&category))?;

            service.delete(cat.id())?;
            println!("Deleted category: {}", cat.name());
        }
    }

    Ok(())
}
