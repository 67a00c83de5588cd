use std::sync::RwLock;

use tracing::debug;

use klabis_core::ExpectedVersion;

use super::r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

/// In-memory append-only event log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Vec<StoredEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(log: &[StoredEvent]) -> u64 {
        log.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let mut log = self.log.write().map_err(|_| EventStoreError::Poisoned)?;
        let current = Self::current_version(&log);

        if !expected_version.matches(current) {
            return Err(EventStoreError::Concurrency {
                expected: expected_version,
                actual: current,
            });
        }

        if events.is_empty() {
            return Ok(vec![]);
        }

        // Nothing below can fail, so the batch lands completely.
        let mut committed = Vec::with_capacity(events.len());
        for (offset, e) in (1u64..).zip(events) {
            committed.push(StoredEvent {
                event_id: e.event_id,
                aggregate_type: e.aggregate_type,
                sequence_number: current + offset,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            });
        }
        log.extend(committed.iter().cloned());

        debug!(
            first = current + 1,
            count = committed.len(),
            "appended events to the log"
        );
        Ok(committed)
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(log.clone())
    }

    fn load_after(&self, after: u64) -> Result<Vec<StoredEvent>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        // Sequence numbers are dense and start at 1.
        let skip = usize::try_from(after).unwrap_or(usize::MAX).min(log.len());
        Ok(log[skip..].to_vec())
    }

    fn version(&self) -> Result<u64, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(Self::current_version(&log))
    }

    fn len(&self) -> Result<usize, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(log.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn event(n: u64) -> UncommittedEvent {
        UncommittedEvent {
            event_id: Uuid::now_v7(),
            aggregate_type: "test.counter".to_string(),
            event_type: "test.counter.ticked".to_string(),
            event_version: 1,
            occurred_at: Utc::now(),
            payload: json!({ "n": n }),
        }
    }

    #[test]
    fn sequence_numbers_continue_across_appends() {
        let store = InMemoryEventStore::new();

        let first = store
            .append(vec![event(1), event(2)], ExpectedVersion::Exact(0))
            .unwrap();
        let second = store.append(vec![event(3)], ExpectedVersion::Exact(2)).unwrap();

        assert_eq!(
            first.iter().map(|e| e.sequence_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(second[0].sequence_number, 3);
        assert_eq!(store.version().unwrap(), 3);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn stale_expected_version_stores_nothing() {
        let store = InMemoryEventStore::new();
        store.append(vec![event(1)], ExpectedVersion::Any).unwrap();

        let err = store
            .append(vec![event(2), event(3)], ExpectedVersion::Exact(0))
            .unwrap_err();

        assert!(matches!(err, EventStoreError::Concurrency { actual: 1, .. }));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let store = InMemoryEventStore::new();
        assert!(store.append(vec![], ExpectedVersion::Exact(0)).unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn load_after_skips_known_events() {
        let store = InMemoryEventStore::new();
        store
            .append(vec![event(1), event(2), event(3)], ExpectedVersion::Any)
            .unwrap();

        let tail = store.load_after(1).unwrap();
        assert_eq!(
            tail.iter().map(|e| e.sequence_number).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert!(store.load_after(10).unwrap().is_empty());
    }
}
