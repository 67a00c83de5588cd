//! Finance reactions to facts published by the members and events modules.

use tracing::{info, warn};

use klabis_core::MoneyAmount;
use klabis_events::{BusMessage, IntegrationEvent};
use klabis_finance::FinanceError;

use crate::event_store::EventStore;
use crate::service::{Ledger, ServiceError};

pub struct FinanceEventsListener<S> {
    ledger: Ledger<S>,
    opening_balance: MoneyAmount,
}

impl<S> FinanceEventsListener<S>
where
    S: EventStore,
{
    pub fn new(ledger: Ledger<S>, opening_balance: MoneyAmount) -> Self {
        Self {
            ledger,
            opening_balance,
        }
    }

    /// Bus entry point. Committed finance events are not for this listener.
    pub fn on_message(&self, message: BusMessage) -> Result<(), ServiceError> {
        match message {
            BusMessage::Integration(event) => self.handle(&event),
            BusMessage::Committed(_) => Ok(()),
        }
    }

    pub fn handle(&self, event: &IntegrationEvent) -> Result<(), ServiceError> {
        match event {
            IntegrationEvent::MemberRegistered { member_id, .. } => {
                match self.ledger.create_account(*member_id, self.opening_balance) {
                    Err(ServiceError::Finance(FinanceError::AccountAlreadyExists(_))) => {
                        warn!(member_id = %member_id, "finance account already exists, registration ignored");
                        Ok(())
                    }
                    other => other,
                }
            }
            IntegrationEvent::EventRegistrationCreated {
                event_id,
                member_id,
                cost,
                ..
            } => match cost {
                Some(cost) if !cost.is_zero() => {
                    info!(event_id = %event_id, member_id = %member_id, amount = %cost, "charging event registration");
                    self.ledger
                        .register_payment_for_event(*member_id, *cost)
                        .map(|_| ())
                }
                _ => Ok(()),
            },
            IntegrationEvent::EventRegistrationRemoved {
                event_id,
                member_id,
                cost,
                ..
            } => match cost {
                Some(cost) if !cost.is_zero() => {
                    info!(event_id = %event_id, member_id = %member_id, amount = %cost, "refunding event registration");
                    self.ledger.refund_event(*member_id, *cost).map(|_| ())
                }
                _ => Ok(()),
            },
            IntegrationEvent::EventCostChanged { event_id, .. } => {
                warn!(event_id = %event_id, "event cost change is not reflected in member accounts");
                Ok(())
            }
        }
    }
}
