use std::sync::Arc;

use tracing::{debug, info, warn};

use klabis_core::{ExpectedVersion, MemberId, MoneyAmount};
use klabis_finance::{
    Account, AccountProjector, Accounts, AccountsProjector, FinanceError, TransactionHistory,
    TransactionItem,
};

use super::ServiceError;
use crate::event_store::EventStore;
use crate::repository::EventsRepository;

/// Authorization-free finance operations over the event log.
pub struct Ledger<S> {
    repository: Arc<EventsRepository<S>>,
    max_retries: u32,
}

impl<S> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            max_retries: self.max_retries,
        }
    }
}

impl<S> Ledger<S>
where
    S: EventStore,
{
    pub fn new(repository: Arc<EventsRepository<S>>, max_retries: u32) -> Self {
        Self {
            repository,
            max_retries,
        }
    }

    pub fn repository(&self) -> &EventsRepository<S> {
        &self.repository
    }

    pub fn account(&self, member: MemberId) -> Result<Account, ServiceError> {
        self.repository
            .project(AccountProjector::new(member))?
            .ok_or(ServiceError::Finance(FinanceError::AccountNotFound(member)))
    }

    pub fn accounts(&self) -> Result<Accounts, ServiceError> {
        Ok(self
            .repository
            .project(AccountsProjector::new())?
            .unwrap_or_default())
    }

    pub fn transaction_history(&self, member: MemberId) -> Result<Vec<TransactionItem>, ServiceError> {
        // Only existing accounts have a history.
        self.account(member)?;
        Ok(self
            .repository
            .project(TransactionHistory::new(member))?
            .unwrap_or_default())
    }

    /// Rebuild every account, let `decide` change them, commit what it recorded.
    ///
    /// `decide` may run more than once when another writer got in between.
    pub fn execute<T>(
        &self,
        decide: impl Fn(&mut Accounts) -> Result<T, FinanceError>,
    ) -> Result<T, ServiceError> {
        let mut attempt: u32 = 0;

        loop {
            let (accounts, version) = self.repository.project_with_version(AccountsProjector::new())?;
            let mut accounts = accounts.unwrap_or_default();

            let outcome = decide(&mut accounts)?;

            match self
                .repository
                .append_pending_events_from(&mut accounts, ExpectedVersion::Exact(version))
            {
                Ok(committed) => {
                    debug!(version, committed = committed.len(), "ledger change committed");
                    return Ok(outcome);
                }
                Err(err) if err.is_concurrency() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, version, "ledger changed concurrently, retrying");
                }
                Err(err) if err.is_concurrency() => {
                    return Err(ServiceError::ConcurrencyRetriesExhausted {
                        attempts: attempt + 1,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn create_account(
        &self,
        member: MemberId,
        initial_balance: MoneyAmount,
    ) -> Result<(), ServiceError> {
        self.execute(|accounts| accounts.create_account(member, initial_balance).map(|_| ()))?;
        info!(member_id = %member, initial_balance = %initial_balance, "finance account created");
        Ok(())
    }

    /// Returns the new balance.
    pub fn deposit(&self, member: MemberId, amount: MoneyAmount) -> Result<MoneyAmount, ServiceError> {
        let balance = self.execute(|accounts| {
            let account = account_mut(accounts, member)?;
            account.deposit(amount)?;
            Ok(account.balance())
        })?;
        info!(member_id = %member, amount = %amount, "money deposited");
        Ok(balance)
    }

    /// Returns the new balance.
    pub fn withdraw(&self, member: MemberId, amount: MoneyAmount) -> Result<MoneyAmount, ServiceError> {
        let balance = self.execute(|accounts| {
            let account = account_mut(accounts, member)?;
            account.withdraw(amount)?;
            Ok(account.balance())
        })?;
        info!(member_id = %member, amount = %amount, "money withdrawn");
        Ok(balance)
    }

    pub fn register_payment_for_event(
        &self,
        member: MemberId,
        cost: MoneyAmount,
    ) -> Result<MoneyAmount, ServiceError> {
        let balance = self.execute(|accounts| {
            let account = account_mut(accounts, member)?;
            account.register_payment_for_event(cost)?;
            Ok(account.balance())
        })?;
        info!(member_id = %member, amount = %cost, "event fee charged");
        Ok(balance)
    }

    pub fn refund_event(&self, member: MemberId, cost: MoneyAmount) -> Result<MoneyAmount, ServiceError> {
        let balance = self.execute(|accounts| {
            let account = account_mut(accounts, member)?;
            account.refund_event(cost)?;
            Ok(account.balance())
        })?;
        info!(member_id = %member, amount = %cost, "event fee refunded");
        Ok(balance)
    }
}

fn account_mut(accounts: &mut Accounts, member: MemberId) -> Result<&mut Account, FinanceError> {
    accounts
        .account_mut(member)
        .ok_or(FinanceError::AccountNotFound(member))
}
