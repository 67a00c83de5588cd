use serde::{Deserialize, Serialize};

use klabis_auth::{ApplicationGrant, Principal, authorize, authorize_member_access};
use klabis_core::{MemberId, MoneyAmount};
use klabis_finance::{Account, TransactionItem};

use super::{Ledger, ServiceError, TransferMoneyUseCase};
use crate::event_store::{EventFilter, EventPage, EventStore, Pagination};

/// Deposit requested by a finance administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAction {
    pub amount: MoneyAmount,
}

/// Finance operations on behalf of an authenticated caller.
///
/// Access rules:
/// - reading an account or its history: own account, `MembersEdit` or `SystemAdmin`
/// - deposits: `DepositFinance`
/// - transfers: own source account or `DepositFinance`
/// - raw event log: `SystemAdmin`
pub struct AccountsService<S> {
    ledger: Ledger<S>,
    transfer: TransferMoneyUseCase<S>,
    max_page_size: u32,
}

impl<S> AccountsService<S>
where
    S: EventStore,
{
    pub fn new(ledger: Ledger<S>, max_page_size: u32) -> Self {
        let transfer = TransferMoneyUseCase::new(ledger.clone());
        Self {
            ledger,
            transfer,
            max_page_size,
        }
    }

    pub fn account_for_member(&self, principal: &Principal, member: MemberId) -> Result<Account, ServiceError> {
        authorize_member_access(principal, member)?;
        self.ledger.account(member)
    }

    pub fn transaction_history(
        &self,
        principal: &Principal,
        member: MemberId,
    ) -> Result<Vec<TransactionItem>, ServiceError> {
        authorize_member_access(principal, member)?;
        self.ledger.transaction_history(member)
    }

    /// Returns the new balance.
    pub fn deposit(
        &self,
        principal: &Principal,
        member: MemberId,
        action: DepositAction,
    ) -> Result<MoneyAmount, ServiceError> {
        authorize(principal, ApplicationGrant::DepositFinance)?;
        self.ledger.deposit(member, action.amount)
    }

    pub fn transfer_money(
        &self,
        principal: &Principal,
        from: MemberId,
        to: MemberId,
        amount: MoneyAmount,
    ) -> Result<(), ServiceError> {
        if !principal.is_member(from) {
            authorize(principal, ApplicationGrant::DepositFinance)?;
        }
        self.transfer.transfer_money(from, to, amount)
    }

    pub fn events(
        &self,
        principal: &Principal,
        filter: &EventFilter,
        pagination: Pagination,
    ) -> Result<EventPage, ServiceError> {
        authorize(principal, ApplicationGrant::SystemAdmin)?;
        Ok(self
            .ledger
            .repository()
            .events(filter, pagination.capped(self.max_page_size))?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use klabis_auth::AuthzError;

    use super::*;
    use crate::event_store::InMemoryEventStore;
    use crate::repository::EventsRepository;

    fn member(id: u64) -> MemberId {
        MemberId::new(id)
    }

    fn service() -> AccountsService<InMemoryEventStore> {
        let ledger = Ledger::new(Arc::new(EventsRepository::new(InMemoryEventStore::new())), 3);
        ledger.create_account(member(1), MoneyAmount::of(100)).unwrap();
        ledger.create_account(member(2), MoneyAmount::ZERO).unwrap();
        AccountsService::new(ledger, 2)
    }

    #[test]
    fn members_read_only_their_own_account() {
        let service = service();
        let me = Principal::member(member(1));

        assert_eq!(
            service.account_for_member(&me, member(1)).unwrap().balance(),
            MoneyAmount::of(100)
        );
        assert!(matches!(
            service.account_for_member(&me, member(2)),
            Err(ServiceError::Unauthorized(AuthzError::NotOwnMember(_)))
        ));
        assert!(service.transaction_history(&me, member(1)).unwrap().is_empty());
    }

    #[test]
    fn deposit_requires_the_finance_grant() {
        let service = service();

        assert!(matches!(
            service.deposit(&Principal::member(member(1)), member(1), DepositAction { amount: MoneyAmount::of(5) }),
            Err(ServiceError::Unauthorized(AuthzError::MissingGrant(ApplicationGrant::DepositFinance)))
        ));

        let treasurer = Principal::default().with_grant(ApplicationGrant::DepositFinance);
        let balance = service
            .deposit(&treasurer, member(2), DepositAction { amount: MoneyAmount::of(5) })
            .unwrap();
        assert_eq!(balance, MoneyAmount::of(5));
    }

    #[test]
    fn members_transfer_only_from_their_own_account() {
        let service = service();

        assert!(matches!(
            service.transfer_money(&Principal::member(member(2)), member(1), member(2), MoneyAmount::of(10)),
            Err(ServiceError::Unauthorized(_))
        ));

        service
            .transfer_money(&Principal::member(member(1)), member(1), member(2), MoneyAmount::of(10))
            .unwrap();

        let history = service
            .transaction_history(&Principal::member(member(2)), member(2))
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn event_log_is_for_admins_and_paged() {
        let service = service();

        assert!(service
            .events(&Principal::member(member(1)), &EventFilter::default(), Pagination::default())
            .is_err());

        let admin = Principal::default().with_grant(ApplicationGrant::SystemAdmin);
        let page = service
            .events(&admin, &EventFilter::default(), Pagination::new(Some(10), None))
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.pagination.limit, 2);
        assert_eq!(page.events.len(), 2);
    }
}
