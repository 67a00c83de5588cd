use tracing::info;

use klabis_core::{MemberId, MoneyAmount};

use super::{Ledger, ServiceError};
use crate::event_store::EventStore;

/// Money transfer between two member accounts, without authorization checks.
pub struct TransferMoneyUseCase<S> {
    ledger: Ledger<S>,
}

impl<S> Clone for TransferMoneyUseCase<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<S> TransferMoneyUseCase<S>
where
    S: EventStore,
{
    pub fn new(ledger: Ledger<S>) -> Self {
        Self { ledger }
    }

    pub fn transfer_money(
        &self,
        from: MemberId,
        to: MemberId,
        amount: MoneyAmount,
    ) -> Result<(), ServiceError> {
        self.ledger
            .execute(|accounts| accounts.transfer_money(from, to, amount))?;
        info!(from = %from, to = %to, amount = %amount, "money transferred");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use klabis_finance::FinanceError;

    use super::*;
    use crate::event_store::InMemoryEventStore;
    use crate::repository::EventsRepository;

    fn member(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn setup() -> (Ledger<InMemoryEventStore>, TransferMoneyUseCase<InMemoryEventStore>) {
        let ledger = Ledger::new(Arc::new(EventsRepository::new(InMemoryEventStore::new())), 3);
        ledger.create_account(member(1), MoneyAmount::of(50)).unwrap();
        ledger.create_account(member(2), MoneyAmount::ZERO).unwrap();
        let transfer = TransferMoneyUseCase::new(ledger.clone());
        (ledger, transfer)
    }

    #[test]
    fn transfer_is_committed_as_one_event() {
        let (ledger, transfer) = setup();

        transfer
            .transfer_money(member(1), member(2), MoneyAmount::of(20))
            .unwrap();

        assert_eq!(ledger.repository().size().unwrap(), 3);
        assert_eq!(ledger.account(member(1)).unwrap().balance(), MoneyAmount::of(30));
        assert_eq!(ledger.account(member(2)).unwrap().balance(), MoneyAmount::of(20));
    }

    #[test]
    fn failed_transfer_leaves_the_log_alone() {
        let (ledger, transfer) = setup();

        let err = transfer
            .transfer_money(member(2), member(1), MoneyAmount::of(1))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Finance(FinanceError::InsufficientFundsForTransfer { .. })
        ));
        assert_eq!(ledger.repository().size().unwrap(), 2);
    }
}
