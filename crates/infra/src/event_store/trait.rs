use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use klabis_core::ExpectedVersion;
use klabis_events::{Event, EventEnvelope};

use super::query::{EventFilter, EventPage, Pagination};

/// An event ready to be appended to the log (no sequence number yet).
///
/// ## Event lifecycle
///
/// 1. **Domain event**: recorded as pending by an `EventsSource` mutator
/// 2. **UncommittedEvent**: serialized payload plus metadata
/// 3. **StoredEvent**: persisted with its global sequence number
/// 4. **EventEnvelope**: handed to projectors and published on the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub aggregate_type: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl UncommittedEvent {
    /// Serialize a typed event, capturing the metadata needed to decode it later.
    pub fn from_typed<E>(event: &E) -> Result<Self, EventStoreError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)
            .map_err(|e| EventStoreError::InvalidAppend(format!("payload serialization failed: {e}")))?;

        Ok(Self {
            event_id: Uuid::now_v7(),
            aggregate_type: E::AGGREGATE_TYPE.to_string(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

/// An event persisted in the append-only log.
///
/// Sequence numbers are global to the log: the first stored event is 1 and
/// every append continues from the last one, without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_type: String,

    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    /// Envelope with the raw JSON payload, as published on the bus.
    pub fn to_envelope(&self) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            self.event_id,
            self.sequence_number,
            self.aggregate_type.clone(),
            self.event_type.clone(),
            self.occurred_at,
            self.payload.clone(),
        )
    }

    /// Envelope with the payload decoded into `E`.
    pub fn decode<E: DeserializeOwned>(&self) -> Result<EventEnvelope<E>, EventStoreError> {
        self.to_envelope().try_map(|payload| {
            serde_json::from_value(payload).map_err(|e| {
                EventStoreError::Decode(format!(
                    "event #{} ({}): {e}",
                    self.sequence_number, self.event_type
                ))
            })
        })
    }
}

/// Event store failure. Infrastructure errors only; rule violations are
/// domain errors.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed (expected {expected:?}, actual {actual})")]
    Concurrency {
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("failed to decode stored event: {0}")]
    Decode(String),

    #[error("event store lock poisoned")]
    Poisoned,
}

impl EventStoreError {
    pub fn is_concurrency(&self) -> bool {
        matches!(self, EventStoreError::Concurrency { .. })
    }
}

/// Append-only event log.
///
/// ## Append semantics
///
/// - the expected version is checked against the version of the whole log
///   (the sequence number of its last event, 0 when empty)
/// - sequence numbers are assigned from `version + 1` in batch order
/// - a batch is stored completely or not at all
///
/// ## Load semantics
///
/// Events are always returned in sequence order.
pub trait EventStore: Send + Sync {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Events with a sequence number greater than `after`.
    fn load_after(&self, after: u64) -> Result<Vec<StoredEvent>, EventStoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|e| e.sequence_number > after)
            .collect())
    }

    fn version(&self) -> Result<u64, EventStoreError>;

    fn len(&self) -> Result<usize, EventStoreError>;

    fn is_empty(&self) -> Result<bool, EventStoreError> {
        Ok(self.len()? == 0)
    }

    /// One page of the events matching `filter`, in sequence order.
    fn page(&self, filter: &EventFilter, pagination: Pagination) -> Result<EventPage, EventStoreError> {
        Ok(EventPage::collect(self.load_all()?, filter, pagination))
    }
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_all()
    }

    fn load_after(&self, after: u64) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_after(after)
    }

    fn version(&self) -> Result<u64, EventStoreError> {
        (**self).version()
    }

    fn len(&self) -> Result<usize, EventStoreError> {
        (**self).len()
    }

    fn page(&self, filter: &EventFilter, pagination: Pagination) -> Result<EventPage, EventStoreError> {
        (**self).page(filter, pagination)
    }
}
