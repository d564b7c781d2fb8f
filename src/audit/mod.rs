//! Audit trail of dispatched domain events
//!
//! - `AuditEntry`: one dispatched event, with its payload kept as JSON.
//! - `AuditLogger`: appends entries to a line-delimited JSON (JSONL) file and
//!   reads them back for the `audit` command.
//!
//! Entries are written by the audit event handler after a successful commit,
//! so the log never records a change that was not persisted.

mod entry;
mod logger;

pub use entry::AuditEntry;
pub use logger::AuditLogger;
