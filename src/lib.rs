//! Finance Tracker - personal income, expense and budget tracking
//!
//! Categories classify money as income or expense, transactions record it, and
//! monthly budgets cap spending per expense category. Aggregates raise domain
//! events that are dispatched only after storage has been committed.
//!
//! # Architecture
//!
//! - `models`: money, identifiers and the category, transaction and budget aggregates
//! - `events`: domain events, the dispatcher and built-in handlers
//! - `storage`: JSON file repositories
//! - `services`: application services and the unit of work
//! - `audit`: JSONL audit trail of dispatched events
//! - `config`: paths and settings
//! - `cli` / `display`: the command line surface
//!
//! # Example
//!
//! ```rust,ignore
//! use finance_tracker::config::{paths::FinancePaths, settings::Settings};
//!
//! let paths = FinancePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{FinanceError, FinanceResult};

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install the global tracing subscriber, writing to stderr
///
/// `RUST_LOG` wins over `default_filter`. Later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
