use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use klabis_core::{MemberId, MoneyAmount};
use klabis_events::{BusMessage, Event, EventEnvelope, EventsSource};
use klabis_finance::{Accounts, FinanceError, LedgerEvent};

use crate::event_store::{EventStore, EventStoreError};

/// Read model row: current balance of one member's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub member_id: MemberId,
    pub balance: MoneyAmount,
}

#[derive(Debug, Error)]
pub enum BalancesProjectionError {
    #[error("failed to deserialize finance event #{sequence_number}: {message}")]
    Deserialize { sequence_number: u64, message: String },

    #[error("finance event #{sequence_number} cannot be applied: {source}")]
    Apply {
        sequence_number: u64,
        source: FinanceError,
    },

    #[error(transparent)]
    Store(#[from] EventStoreError),

    #[error("finance event #{found} arrived before #{expected}")]
    Gap { expected: u64, found: u64 },

    #[error("read model lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct State {
    last_sequence_number: u64,
    accounts: Accounts,
}

/// Projection: committed finance events → balance per member.
///
/// Disposable; `rebuild` recreates it from the log. Envelopes at or below
/// the last applied sequence number are skipped, so redelivery is harmless.
/// An envelope past the next expected one means messages were lost; the bus
/// handler then reads the missing part from the log.
#[derive(Debug, Default)]
pub struct AccountBalancesProjection {
    state: RwLock<State>,
}

impl AccountBalancesProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, member: MemberId) -> Option<AccountBalance> {
        let state = self.state.read().ok()?;
        state.accounts.account(member).map(|a| AccountBalance {
            member_id: a.owner(),
            balance: a.balance(),
        })
    }

    /// All balances ordered by member id.
    pub fn list(&self) -> Vec<AccountBalance> {
        match self.state.read() {
            Ok(state) => state
                .accounts
                .iter()
                .map(|a| AccountBalance {
                    member_id: a.owner(),
                    balance: a.balance(),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn total(&self) -> MoneyAmount {
        self.state
            .read()
            .map(|s| s.accounts.total_balance())
            .unwrap_or(MoneyAmount::ZERO)
    }

    pub fn last_sequence_number(&self) -> u64 {
        self.state.read().map(|s| s.last_sequence_number).unwrap_or(0)
    }

    /// Bus entry point; only committed finance events are relevant.
    ///
    /// `store` is the log the envelopes come from, read when a gap shows up.
    pub fn on_message<S: EventStore + ?Sized>(
        &self,
        message: BusMessage,
        store: &S,
    ) -> Result<(), BalancesProjectionError> {
        let envelope = match message {
            BusMessage::Committed(envelope) => envelope,
            BusMessage::Integration(_) => return Ok(()),
        };

        match self.apply_envelope(&envelope) {
            Err(BalancesProjectionError::Gap { expected, found }) => {
                warn!(expected, found, "gap in committed finance events, catching up from the log");
                self.catch_up(store)
            }
            other => other.map(|_| ()),
        }
    }

    /// Apply one committed envelope. Returns whether it changed the model.
    ///
    /// Envelopes must arrive in sequence order; one past the next expected
    /// sequence number is rejected with `Gap` and leaves the model untouched.
    pub fn apply_envelope(&self, envelope: &EventEnvelope<JsonValue>) -> Result<bool, BalancesProjectionError> {
        let seq = envelope.sequence_number();
        let mut state = self.state.write().map_err(|_| BalancesProjectionError::Poisoned)?;

        if seq <= state.last_sequence_number {
            debug!(sequence_number = seq, "finance event already projected");
            return Ok(false);
        }
        if seq > state.last_sequence_number + 1 {
            return Err(BalancesProjectionError::Gap {
                expected: state.last_sequence_number + 1,
                found: seq,
            });
        }

        // Sequence numbers are global, so other streams still move the cursor.
        if envelope.aggregate_type() != LedgerEvent::AGGREGATE_TYPE {
            state.last_sequence_number = seq;
            return Ok(false);
        }

        let event: LedgerEvent = serde_json::from_value(envelope.payload().clone()).map_err(|e| {
            BalancesProjectionError::Deserialize {
                sequence_number: seq,
                message: e.to_string(),
            }
        })?;

        state
            .accounts
            .apply(&event)
            .map_err(|source| BalancesProjectionError::Apply {
                sequence_number: seq,
                source,
            })?;
        state.last_sequence_number = seq;
        Ok(true)
    }

    /// Drop everything and replay the whole log.
    pub fn rebuild<S: EventStore + ?Sized>(&self, store: &S) -> Result<(), BalancesProjectionError> {
        {
            let mut state = self.state.write().map_err(|_| BalancesProjectionError::Poisoned)?;
            *state = State::default();
        }
        self.catch_up(store)
    }

    /// Apply the log events this projection has not seen yet.
    pub fn catch_up<S: EventStore + ?Sized>(&self, store: &S) -> Result<(), BalancesProjectionError> {
        for stored in store.load_after(self.last_sequence_number())? {
            self.apply_envelope(&stored.to_envelope())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use klabis_core::ExpectedVersion;

    use super::*;
    use crate::event_store::{InMemoryEventStore, UncommittedEvent};

    fn member(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn store_with(events: &[LedgerEvent]) -> InMemoryEventStore {
        let store = InMemoryEventStore::new();
        let batch = events
            .iter()
            .map(|e| UncommittedEvent::from_typed(e).unwrap())
            .collect();
        store.append(batch, ExpectedVersion::Exact(0)).unwrap();
        store
    }

    fn sample_store() -> InMemoryEventStore {
        store_with(&[
            LedgerEvent::account_created(member(1), MoneyAmount::of(10)),
            LedgerEvent::account_created(member(2), MoneyAmount::ZERO),
            LedgerEvent::transferred(member(1), member(2), MoneyAmount::of(4)),
        ])
    }

    #[test]
    fn redelivered_envelopes_are_skipped() {
        let store = sample_store();
        let projection = AccountBalancesProjection::new();

        for stored in store.load_all().unwrap() {
            assert!(projection.apply_envelope(&stored.to_envelope()).unwrap());
        }
        for stored in store.load_all().unwrap() {
            assert!(!projection.apply_envelope(&stored.to_envelope()).unwrap());
        }

        assert_eq!(projection.get(member(2)).unwrap().balance, MoneyAmount::of(4));
        assert_eq!(projection.total(), MoneyAmount::of(10));
        assert_eq!(projection.last_sequence_number(), 3);
    }

    #[test]
    fn rebuild_matches_incremental_application() {
        let store = sample_store();
        let incremental = AccountBalancesProjection::new();
        for stored in store.load_all().unwrap() {
            incremental
                .on_message(BusMessage::Committed(stored.to_envelope()), &store)
                .unwrap();
        }

        let rebuilt = AccountBalancesProjection::new();
        rebuilt.rebuild(&store).unwrap();

        assert_eq!(rebuilt.list(), incremental.list());
        assert_eq!(
            rebuilt.list(),
            vec![
                AccountBalance { member_id: member(1), balance: MoneyAmount::of(6) },
                AccountBalance { member_id: member(2), balance: MoneyAmount::of(4) },
            ]
        );
    }

    #[test]
    fn foreign_aggregates_only_move_the_cursor() {
        let projection = AccountBalancesProjection::new();
        let envelope = EventEnvelope::new(
            uuid::Uuid::now_v7(),
            1,
            "members.member",
            "members.member.registered",
            chrono::Utc::now(),
            serde_json::json!({}),
        );
        assert!(!projection.apply_envelope(&envelope).unwrap());
        assert_eq!(projection.last_sequence_number(), 1);
        assert!(projection.list().is_empty());
    }

    #[test]
    fn out_of_order_envelope_is_rejected_as_a_gap() {
        let store = store_with(&[
            LedgerEvent::account_created(member(1), MoneyAmount::of(10)),
            LedgerEvent::deposited(member(1), MoneyAmount::of(5)),
            LedgerEvent::deposited(member(1), MoneyAmount::of(7)),
        ]);
        let envelopes: Vec<_> = store.load_all().unwrap().iter().map(|s| s.to_envelope()).collect();
        let projection = AccountBalancesProjection::new();

        projection.apply_envelope(&envelopes[0]).unwrap();
        let err = projection.apply_envelope(&envelopes[2]).unwrap_err();

        assert!(matches!(err, BalancesProjectionError::Gap { expected: 2, found: 3 }));
        assert_eq!(projection.last_sequence_number(), 1);
        assert_eq!(projection.get(member(1)).unwrap().balance, MoneyAmount::of(10));
    }

    #[test]
    fn gap_on_the_bus_is_filled_from_the_log() {
        let store = store_with(&[
            LedgerEvent::account_created(member(1), MoneyAmount::of(10)),
            LedgerEvent::deposited(member(1), MoneyAmount::of(5)),
            LedgerEvent::deposited(member(1), MoneyAmount::of(7)),
        ]);
        let envelopes: Vec<_> = store.load_all().unwrap().iter().map(|s| s.to_envelope()).collect();
        let projection = AccountBalancesProjection::new();

        projection
            .on_message(BusMessage::Committed(envelopes[0].clone()), &store)
            .unwrap();
        projection
            .on_message(BusMessage::Committed(envelopes[2].clone()), &store)
            .unwrap();
        projection
            .on_message(BusMessage::Committed(envelopes[1].clone()), &store)
            .unwrap();

        assert_eq!(projection.last_sequence_number(), 3);
        assert_eq!(projection.get(member(1)).unwrap().balance, MoneyAmount::of(22));
    }
}
