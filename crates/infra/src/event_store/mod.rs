//! Append-only event log boundary.
//!
//! Storage-agnostic abstraction over one global, totally ordered log of
//! serialized events.

pub mod in_memory;
pub mod query;
pub mod r#trait;

use std::sync::Mutex;

use tracing::warn;

use klabis_core::ExpectedVersion;
use klabis_events::{BusMessage, EventBus};

pub use in_memory::InMemoryEventStore;
pub use query::{EventFilter, EventPage, Pagination};
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

/// Adapter that publishes committed events to an `EventBus` after a successful append.
///
/// - a rejected append publishes nothing
/// - append and publish run under one lock, so the bus sees events in
///   sequence order
/// - a failed publish does not fail the append; the events are in the log
///   and subscribers catch up from there
pub struct PublishingEventStore<S, B> {
    store: S,
    bus: B,
    append_lock: Mutex<()>,
}

impl<S, B> PublishingEventStore<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self {
            store,
            bus,
            append_lock: Mutex::new(()),
        }
    }
}

impl<S, B> EventStore for PublishingEventStore<S, B>
where
    S: EventStore,
    B: EventBus<BusMessage>,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let _guard = self.append_lock.lock().map_err(|_| EventStoreError::Poisoned)?;
        let committed = self.store.append(events, expected_version)?;

        for e in &committed {
            if let Err(err) = self.bus.publish(BusMessage::Committed(e.to_envelope())) {
                warn!(sequence_number = e.sequence_number, error = ?err, "failed to publish committed event");
            }
        }

        Ok(committed)
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.store.load_all()
    }

    fn load_after(&self, after: u64) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.store.load_after(after)
    }

    fn version(&self) -> Result<u64, EventStoreError> {
        self.store.version()
    }

    fn len(&self) -> Result<usize, EventStoreError> {
        self.store.len()
    }
}
