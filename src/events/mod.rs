//! Domain events and their post-commit delivery
//!
//! Aggregates queue [`DomainEvent`]s while they are mutated. The unit of work
//! drains them, commits storage, and only then hands them to the
//! [`EventDispatcher`], which delivers each event to the handlers subscribed
//! to its [`EventKind`].

mod dispatcher;
mod domain_event;
mod handlers;

pub use dispatcher::{DomainEventHandler, EventDispatcher};
pub use domain_event::{DomainEvent, EventKind, EventPayload};
pub use handlers::{AuditHandler, LoggingHandler, RecordingHandler};
