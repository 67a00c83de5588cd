//! Integration events raised by the members and events modules.
//!
//! Finance does not own these facts; it only reacts to them (open an account
//! for a new member, charge or refund event registrations).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use klabis_core::{MemberId, MoneyAmount, SportEventId};

use crate::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationEvent {
    /// A new member finished registration.
    MemberRegistered {
        member_id: MemberId,
        occurred_at: DateTime<Utc>,
    },
    /// A member registered for a sport event. `cost` is the entry fee, if any.
    EventRegistrationCreated {
        event_id: SportEventId,
        member_id: MemberId,
        cost: Option<MoneyAmount>,
        occurred_at: DateTime<Utc>,
    },
    /// A member cancelled a sport event registration.
    EventRegistrationRemoved {
        event_id: SportEventId,
        member_id: MemberId,
        cost: Option<MoneyAmount>,
        occurred_at: DateTime<Utc>,
    },
    /// The entry fee of a sport event changed.
    EventCostChanged {
        event_id: SportEventId,
        cost: Option<MoneyAmount>,
        occurred_at: DateTime<Utc>,
    },
}

impl IntegrationEvent {
    pub fn member_registered(member_id: MemberId) -> Self {
        Self::MemberRegistered {
            member_id,
            occurred_at: Utc::now(),
        }
    }

    pub fn registration_created(
        event_id: SportEventId,
        member_id: MemberId,
        cost: Option<MoneyAmount>,
    ) -> Self {
        Self::EventRegistrationCreated {
            event_id,
            member_id,
            cost,
            occurred_at: Utc::now(),
        }
    }

    pub fn registration_removed(
        event_id: SportEventId,
        member_id: MemberId,
        cost: Option<MoneyAmount>,
    ) -> Self {
        Self::EventRegistrationRemoved {
            event_id,
            member_id,
            cost,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for IntegrationEvent {
    const AGGREGATE_TYPE: &'static str = "club.integration";

    fn event_type(&self) -> &'static str {
        match self {
            IntegrationEvent::MemberRegistered { .. } => "members.member.registered",
            IntegrationEvent::EventRegistrationCreated { .. } => "events.registration.created",
            IntegrationEvent::EventRegistrationRemoved { .. } => "events.registration.removed",
            IntegrationEvent::EventCostChanged { .. } => "events.event.cost_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            IntegrationEvent::MemberRegistered { occurred_at, .. }
            | IntegrationEvent::EventRegistrationCreated { occurred_at, .. }
            | IntegrationEvent::EventRegistrationRemoved { occurred_at, .. }
            | IntegrationEvent::EventCostChanged { occurred_at, .. } => *occurred_at,
        }
    }
}
