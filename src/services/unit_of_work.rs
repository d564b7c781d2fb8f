//! Unit of work
//!
//! Collects the events raised by every aggregate touched during one service
//! operation, commits storage, and dispatches the events only once the commit
//! has succeeded.

use tracing::{debug, error};

use crate::error::FinanceResult;
use crate::events::{DomainEvent, EventDispatcher};
use crate::models::Aggregate;
use crate::storage::Storage;

/// One service operation's worth of pending changes
pub struct UnitOfWork<'a> {
    storage: &'a Storage,
    dispatcher: &'a EventDispatcher,
    pending: Vec<DomainEvent>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(storage: &'a Storage, dispatcher: &'a EventDispatcher) -> Self {
        Self {
            storage,
            dispatcher,
            pending: Vec::new(),
        }
    }

    /// Move the aggregate's queued events into this unit, leaving it empty
    pub fn track<A: Aggregate>(&mut self, aggregate: &mut A) {
        self.pending.extend(aggregate.take_domain_events());
    }

    /// Events collected so far
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.pending
    }

    /// Persist every repository, then dispatch the collected events
    ///
    /// If saving fails the events are dropped and the error is returned.
    /// Returns the dispatched events on success.
    pub fn commit(self) -> FinanceResult<Vec<DomainEvent>> {
        let events = self.pending;

        if let Err(e) = self.storage.save_all() {
            error!(error = %e, dropped = events.len(), "commit failed, events not dispatched");
            return Err(e);
        }

        debug!(events = events.len(), "commit succeeded");
        self.dispatcher.dispatch(&events);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinancePaths;
    use crate::events::{EventKind, RecordingHandler};
    use crate::models::{Budget, CategoryId, Money};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinancePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn recording_dispatcher() -> (EventDispatcher, RecordingHandler) {
        let recorder = RecordingHandler::new();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe_all(Arc::new(recorder.clone()));
        (dispatcher, recorder)
    }

    #[test]
    fn test_track_drains_aggregate() {
        let (_temp_dir, storage) = create_test_storage();
        let (dispatcher, recorder) = recording_dispatcher();
        let mut uow = UnitOfWork::new(&storage, &dispatcher);

        let mut budget = Budget::new(CategoryId::new(), Money::usd(dec!(100)), 2025, 1).unwrap();
        uow.track(&mut budget);

        assert!(budget.domain_events().is_empty());
        assert_eq!(uow.pending_events().len(), 1);
        // Nothing dispatched before commit
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_commit_persists_then_dispatches() {
        let (temp_dir, storage) = create_test_storage();
        let (dispatcher, recorder) = recording_dispatcher();
        let mut uow = UnitOfWork::new(&storage, &dispatcher);

        let mut budget = Budget::new(CategoryId::new(), Money::usd(dec!(100)), 2025, 1).unwrap();
        budget.add_expense(&Money::usd(dec!(90))).unwrap();
        uow.track(&mut budget);
        storage.budgets.upsert(budget).unwrap();

        let dispatched = uow.commit().unwrap();

        assert_eq!(dispatched.len(), 2);
        let kinds: Vec<_> = recorder.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::BudgetCreated, EventKind::BudgetNearLimit]);
        assert!(temp_dir.path().join("data").join("budgets.json").exists());
    }

    #[test]
    fn test_failed_commit_dispatches_nothing() {
        let (temp_dir, storage) = create_test_storage();
        let (dispatcher, recorder) = recording_dispatcher();

        // A plain file where the data directory should be makes every save fail
        let data_dir = temp_dir.path().join("data");
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "not a directory").unwrap();

        let mut uow = UnitOfWork::new(&storage, &dispatcher);
        let mut budget = Budget::new(CategoryId::new(), Money::usd(dec!(100)), 2025, 1).unwrap();
        uow.track(&mut budget);
        storage.budgets.upsert(budget).unwrap();

        assert!(uow.commit().is_err());
        assert!(recorder.is_empty());
    }
}
