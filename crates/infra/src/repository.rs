//! Typed access to the event log for event sources and projectors.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use klabis_core::{DomainError, ExpectedVersion};
use klabis_events::{Event, EventsSource, ProjectionError, ProjectionRunner, Projector};

use crate::event_store::{
    EventFilter, EventPage, EventStore, EventStoreError, Pagination, StoredEvent, UncommittedEvent,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Store(#[from] EventStoreError),

    #[error("projection failed: {0}")]
    Projection(String),

    /// The log holds events the domain refuses to replay.
    #[error("inconsistent event log: {0}")]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    pub fn is_concurrency(&self) -> bool {
        matches!(self, RepositoryError::Store(e) if e.is_concurrency())
    }
}

fn projection_error<E>(err: ProjectionError<E>) -> RepositoryError
where
    E: core::fmt::Debug + Into<DomainError>,
{
    match err {
        ProjectionError::NonMonotonicSequence { last, found } => RepositoryError::Projection(format!(
            "non-monotonic sequence number (last={last}, found={found})"
        )),
        ProjectionError::Projector(e) => RepositoryError::Domain(e.into()),
    }
}

/// Repository over the whole event log.
///
/// Reads always see the complete log in sequence order. Writes take an
/// `ExpectedVersion` of the **log** (not of a single aggregate).
#[derive(Debug)]
pub struct EventsRepository<S> {
    store: S,
}

impl<S> EventsRepository<S>
where
    S: EventStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `projector` over every event of its stream, then complete it.
    pub fn project<P>(&self, projector: P) -> Result<Option<P::Output>, RepositoryError>
    where
        P: Projector,
        P::Ev: DeserializeOwned,
        P::Error: Into<DomainError>,
    {
        self.project_with_version(projector).map(|(output, _)| output)
    }

    /// Like `project`, also returning the log version the result reflects.
    pub fn project_with_version<P>(
        &self,
        projector: P,
    ) -> Result<(Option<P::Output>, u64), RepositoryError>
    where
        P: Projector,
        P::Ev: DeserializeOwned,
        P::Error: Into<DomainError>,
    {
        let stored = self.store.load_all()?;
        let version = stored.last().map(|e| e.sequence_number).unwrap_or(0);

        let mut runner = ProjectionRunner::new(projector);
        for e in stored
            .iter()
            .filter(|e| e.aggregate_type == <P::Ev as Event>::AGGREGATE_TYPE)
        {
            let envelope = e.decode::<P::Ev>()?;
            runner.apply(&envelope).map_err(projection_error)?;
        }

        let output = runner.finish().map_err(projection_error)?;
        Ok((output, version))
    }

    /// Replay the log into `source` without recording anything.
    ///
    /// Returns the log version the source now reflects.
    pub fn rebuild<T>(&self, source: &mut T) -> Result<u64, RepositoryError>
    where
        T: EventsSource,
        T::Event: Event + DeserializeOwned,
        T::Error: Into<DomainError>,
    {
        let stored = self.store.load_all()?;
        let version = stored.last().map(|e| e.sequence_number).unwrap_or(0);

        for e in stored
            .iter()
            .filter(|e| e.aggregate_type == <T::Event as Event>::AGGREGATE_TYPE)
        {
            let envelope = e.decode::<T::Event>()?;
            source
                .apply(envelope.payload())
                .map_err(|e| RepositoryError::Domain(e.into()))?;
        }

        Ok(version)
    }

    /// Append the pending events of `source` as one batch.
    ///
    /// The pending events are drained only after the append succeeded; on
    /// failure they stay on the source.
    pub fn append_pending_events_from<T>(
        &self,
        source: &mut T,
        expected: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, RepositoryError>
    where
        T: EventsSource,
        T::Event: Event + Serialize,
    {
        let batch = source
            .pending_events()
            .iter()
            .map(UncommittedEvent::from_typed)
            .collect::<Result<Vec<_>, _>>()?;

        if batch.is_empty() {
            return Ok(vec![]);
        }

        let committed = self.store.append(batch, expected)?;
        source.clear_pending_events();

        debug!(count = committed.len(), "committed pending events");
        Ok(committed)
    }

    pub fn append_event<E>(
        &self,
        event: &E,
        expected: ExpectedVersion,
    ) -> Result<StoredEvent, RepositoryError>
    where
        E: Event + Serialize,
    {
        let batch = vec![UncommittedEvent::from_typed(event)?];
        let mut committed = self.store.append(batch, expected)?;
        committed
            .pop()
            .ok_or_else(|| RepositoryError::Store(EventStoreError::InvalidAppend("append returned no event".into())))
    }

    pub fn events(&self, filter: &EventFilter, pagination: Pagination) -> Result<EventPage, RepositoryError> {
        Ok(self.store.page(filter, pagination)?)
    }

    /// Number of events in the log.
    pub fn size(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.len()?)
    }

    pub fn version(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.version()?)
    }
}

#[cfg(test)]
mod tests {
    use klabis_core::{MemberId, MoneyAmount};
    use klabis_finance::{AccountProjector, Accounts, AccountsProjector, LedgerEvent};

    use super::*;
    use crate::event_store::InMemoryEventStore;

    fn member(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn repo_with_two_accounts() -> EventsRepository<InMemoryEventStore> {
        let repo = EventsRepository::new(InMemoryEventStore::new());
        let mut accounts = Accounts::new();
        accounts.create_account(member(1), MoneyAmount::of(100)).unwrap();
        accounts.create_account(member(2), MoneyAmount::ZERO).unwrap();
        repo.append_pending_events_from(&mut accounts, ExpectedVersion::Exact(0))
            .unwrap();
        repo
    }

    #[test]
    fn append_drains_pending_events() {
        let repo = EventsRepository::new(InMemoryEventStore::new());
        let mut accounts = Accounts::new();
        accounts.create_account(member(1), MoneyAmount::ZERO).unwrap();

        let committed = repo
            .append_pending_events_from(&mut accounts, ExpectedVersion::Exact(0))
            .unwrap();

        assert_eq!(committed.len(), 1);
        assert!(!accounts.has_pending_events());
        assert_eq!(repo.size().unwrap(), 1);
    }

    #[test]
    fn failed_append_keeps_pending_events() {
        let repo = repo_with_two_accounts();
        let mut accounts = Accounts::new();
        accounts.create_account(member(3), MoneyAmount::ZERO).unwrap();

        let err = repo
            .append_pending_events_from(&mut accounts, ExpectedVersion::Exact(0))
            .unwrap_err();

        assert!(err.is_concurrency());
        assert!(accounts.has_pending_events());
        assert_eq!(repo.size().unwrap(), 2);
    }

    #[test]
    fn project_and_rebuild_agree() {
        let repo = repo_with_two_accounts();
        repo.append_event(
            &LedgerEvent::transferred(member(1), member(2), MoneyAmount::of(40)),
            ExpectedVersion::Exact(2),
        )
        .unwrap();

        let (projected, version) = repo.project_with_version(AccountsProjector::new()).unwrap();
        let mut rebuilt = Accounts::new();
        let rebuilt_version = repo.rebuild(&mut rebuilt).unwrap();

        assert_eq!(projected.unwrap(), rebuilt);
        assert_eq!(version, 3);
        assert_eq!(rebuilt_version, 3);
        assert_eq!(rebuilt.account(member(2)).unwrap().balance(), MoneyAmount::of(40));
    }

    #[test]
    fn projecting_an_unknown_member_yields_none() {
        let repo = repo_with_two_accounts();
        assert!(repo.project(AccountProjector::new(member(9))).unwrap().is_none());
    }

    #[test]
    fn inconsistent_log_is_reported() {
        let repo = repo_with_two_accounts();
        repo.append_event(
            &LedgerEvent::withdrawn(member(2), MoneyAmount::of(1)),
            ExpectedVersion::Any,
        )
        .unwrap();

        let err = repo.project(AccountsProjector::new()).unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(DomainError::InvariantViolation(_))));
    }
}
