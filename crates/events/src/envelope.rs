use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Event;

/// An event together with its position in the log.
///
/// Notes:
/// - `sequence_number` is global and strictly increasing (first stored event is 1).
/// - `created_at` is the business time of the event, used for transaction dates.
/// - `payload` is either a typed event or its JSON form as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    sequence_number: u64,
    aggregate_type: String,
    event_type: String,
    created_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        sequence_number: u64,
        aggregate_type: impl Into<String>,
        event_type: impl Into<String>,
        created_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            sequence_number,
            aggregate_type: aggregate_type.into(),
            event_type: event_type.into(),
            created_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    /// Convert the payload while keeping the log metadata (e.g. JSON → typed).
    pub fn try_map<T, Err>(
        self,
        f: impl FnOnce(E) -> Result<T, Err>,
    ) -> Result<EventEnvelope<T>, Err> {
        Ok(EventEnvelope {
            event_id: self.event_id,
            sequence_number: self.sequence_number,
            aggregate_type: self.aggregate_type,
            event_type: self.event_type,
            created_at: self.created_at,
            payload: f(self.payload)?,
        })
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a typed event at a given log position, taking metadata from the event.
    pub fn for_event(sequence_number: u64, event: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            sequence_number,
            E::AGGREGATE_TYPE,
            event.event_type(),
            event.occurred_at(),
            event,
        )
    }
}
