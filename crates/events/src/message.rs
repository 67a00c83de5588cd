use serde_json::Value as JsonValue;

use crate::{EventEnvelope, IntegrationEvent};

/// Everything that travels over the club event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    /// Raised by another module; not part of the finance log.
    Integration(IntegrationEvent),
    /// A finance event right after it was appended to the log.
    Committed(EventEnvelope<JsonValue>),
}

impl From<IntegrationEvent> for BusMessage {
    fn from(value: IntegrationEvent) -> Self {
        BusMessage::Integration(value)
    }
}

impl From<EventEnvelope<JsonValue>> for BusMessage {
    fn from(value: EventEnvelope<JsonValue>) -> Self {
        BusMessage::Committed(value)
    }
}
