//! Transaction history of a member's account.

use chrono::NaiveDate;
use serde::Serialize;

use klabis_core::{MemberId, MoneyAmount};
use klabis_events::{EventEnvelope, Projector};

use crate::{FinanceError, LedgerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Payment,
    TransferOut { to: MemberId },
    TransferIn { from: MemberId },
}

impl TransactionKind {
    /// Human readable note shown next to the transaction.
    pub fn note(&self) -> String {
        match self {
            TransactionKind::Deposit => "Deposit".to_string(),
            TransactionKind::Payment => "Payment".to_string(),
            TransactionKind::TransferOut { to } => format!("Transfer to {to}"),
            TransactionKind::TransferIn { from } => format!("Transfer from {from}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionItem {
    pub sequence_number: u64,
    pub date: NaiveDate,
    pub amount: MoneyAmount,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

/// Lists the money movements of one member's account in log order.
///
/// Opening the account is not a movement; the opening balance shows up only
/// in the account balance.
#[derive(Debug, Clone)]
pub struct TransactionHistory {
    owner: MemberId,
    items: Vec<TransactionItem>,
}

impl TransactionHistory {
    pub fn new(owner: MemberId) -> Self {
        Self {
            owner,
            items: Vec::new(),
        }
    }

    fn kind_of(&self, event: &LedgerEvent) -> Option<TransactionKind> {
        match event {
            LedgerEvent::AccountCreated { .. } => None,
            LedgerEvent::Deposited { .. } => Some(TransactionKind::Deposit),
            LedgerEvent::Withdrawn { .. } => Some(TransactionKind::Payment),
            LedgerEvent::Transferred { from, to, .. } if *from == self.owner => {
                Some(TransactionKind::TransferOut { to: *to })
            }
            LedgerEvent::Transferred { from, .. } => Some(TransactionKind::TransferIn { from: *from }),
        }
    }
}

impl Projector for TransactionHistory {
    type Ev = LedgerEvent;
    type Output = Vec<TransactionItem>;
    type Error = FinanceError;

    fn project(&mut self, envelope: &EventEnvelope<LedgerEvent>) -> Result<(), FinanceError> {
        let event = envelope.payload();
        if !event.concerns(self.owner) {
            return Ok(());
        }

        if let Some(kind) = self.kind_of(event) {
            self.items.push(TransactionItem {
                sequence_number: envelope.sequence_number(),
                date: envelope.created_at().date_naive(),
                amount: event.amount(),
                kind,
            });
        }
        Ok(())
    }

    fn result(self) -> Result<Option<Vec<TransactionItem>>, FinanceError> {
        Ok(Some(self.items))
    }
}

#[cfg(test)]
mod tests {
    use klabis_events::ProjectionRunner;

    use super::*;

    fn member(id: u64) -> MemberId {
        MemberId::new(id)
    }

    #[test]
    fn lists_own_movements_in_order() {
        let envelopes: Vec<_> = vec![
            LedgerEvent::account_created(member(1), MoneyAmount::of(100)),
            LedgerEvent::account_created(member(2), MoneyAmount::ZERO),
            LedgerEvent::withdrawn(member(1), MoneyAmount::of(10)),
            LedgerEvent::deposited(member(2), MoneyAmount::of(7)),
            LedgerEvent::transferred(member(1), member(2), MoneyAmount::of(20)),
            LedgerEvent::transferred(member(2), member(1), MoneyAmount::of(5)),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, e)| EventEnvelope::for_event(i as u64 + 1, e))
        .collect();

        let items =
            ProjectionRunner::rebuild_from_scratch(|| TransactionHistory::new(member(1)), &envelopes)
                .unwrap()
                .unwrap();

        let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Payment,
                TransactionKind::TransferOut { to: member(2) },
                TransactionKind::TransferIn { from: member(2) },
            ]
        );
        assert_eq!(
            items.iter().map(|i| i.sequence_number).collect::<Vec<_>>(),
            vec![3, 5, 6]
        );
        assert_eq!(items[1].amount, MoneyAmount::of(20));
    }

    #[test]
    fn opening_balance_is_not_listed() {
        let envelopes = vec![EventEnvelope::for_event(
            1,
            LedgerEvent::account_created(member(1), MoneyAmount::of(50)),
        )];

        let items =
            ProjectionRunner::rebuild_from_scratch(|| TransactionHistory::new(member(1)), &envelopes)
                .unwrap()
                .unwrap();

        assert!(items.is_empty());
    }

    #[test]
    fn notes_name_the_counterpart() {
        assert_eq!(TransactionKind::TransferOut { to: member(3) }.note(), "Transfer to 3");
        assert_eq!(TransactionKind::TransferIn { from: member(4) }.note(), "Transfer from 4");
    }
}
