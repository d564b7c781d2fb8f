use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use finance_tracker::audit::AuditLogger;
use finance_tracker::cli::{
    handle_audit_command, handle_budget_command, handle_category_command,
    handle_transaction_command, BudgetCommands, CategoryCommands, TransactionCommands,
};
use finance_tracker::config::{paths::FinancePaths, settings::Settings};
use finance_tracker::events::{AuditHandler, EventDispatcher, LoggingHandler};
use finance_tracker::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "finance",
    version,
    about = "Personal finance tracker",
    long_about = "Track income and expenses by category and keep monthly \
                  spending within per-category budgets."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default categories
    Init,

    /// Show current configuration and paths
    Config,

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = FinancePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    finance_tracker::init_tracing(&settings.log_filter);

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let audit_log = AuditLogger::new(paths.audit_log());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe_all(Arc::new(LoggingHandler));
    dispatcher.subscribe_all(Arc::new(AuditHandler::new(audit_log.clone())));

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing finance tracker at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Default categories have been created:");
            println!("  - Income:  Salary, Freelance, Investments");
            println!("  - Expense: Groceries, Transport, Utilities, Entertainment, Healthcare, Shopping");
            println!();
            println!("Run 'finance category list' to see all categories.");
        }
        Some(Commands::Config) => {
            println!("Finance Tracker Configuration");
            println!("=============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Schema version:   {}", settings.schema_version);
            println!("  Default currency: {}", settings.default_currency);
            println!("  Date format:      {}", settings.date_format);
            println!("  Recent limit:     {}", settings.recent_limit);
            println!("  Log filter:       {}", settings.log_filter);
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &dispatcher, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &dispatcher, &settings, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &dispatcher, &settings, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            handle_audit_command(&audit_log, limit)?;
        }
        None => {
            println!("Finance Tracker - income, expenses and monthly budgets");
            println!();
            println!("Run 'finance --help' for usage information.");
            println!("Run 'finance init' to get started.");
        }
    }

    Ok(())
}
