//! All finance accounts of the club.
//!
//! Transfers touch two accounts at once, so they are decided here rather than
//! on a single `Account`. `Transferred` events are recorded by the collection
//! itself; deposits and withdrawals stay on the child accounts.

use std::collections::BTreeMap;

use klabis_core::{MemberId, MoneyAmount};
use klabis_events::{EventsSource, PendingEvents};

use crate::{Account, FinanceError, LedgerEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounts {
    accounts: BTreeMap<MemberId, Account>,
    pending: PendingEvents<LedgerEvent>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_account(
        &mut self,
        owner: MemberId,
        initial_balance: MoneyAmount,
    ) -> Result<&Account, FinanceError> {
        if self.accounts.contains_key(&owner) {
            return Err(FinanceError::AccountAlreadyExists(owner));
        }
        Ok(self
            .accounts
            .entry(owner)
            .or_insert_with(|| Account::open(owner, initial_balance)))
    }

    pub fn account(&self, owner: MemberId) -> Option<&Account> {
        self.accounts.get(&owner)
    }

    pub fn account_mut(&mut self, owner: MemberId) -> Option<&mut Account> {
        self.accounts.get_mut(&owner)
    }

    pub fn account_or_err(&self, owner: MemberId) -> Result<&Account, FinanceError> {
        self.account(owner).ok_or(FinanceError::AccountNotFound(owner))
    }

    /// Accounts ordered by owner id.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of all balances. Transfers never change it.
    pub fn total_balance(&self) -> MoneyAmount {
        self.accounts.values().map(Account::balance).sum()
    }

    /// Move `amount` from one member's account to another's.
    ///
    /// Checks run in this order: source exists, target exists, non-zero
    /// amount, distinct accounts, sufficient funds. Either both balances
    /// change and one `Transferred` is recorded, or nothing changes.
    pub fn transfer_money(
        &mut self,
        from: MemberId,
        to: MemberId,
        amount: MoneyAmount,
    ) -> Result<(), FinanceError> {
        let (source_balance, target_balance) = self.transfer_balances(from, to, amount, true)?;

        self.set_balance(from, source_balance)?;
        self.set_balance(to, target_balance)?;
        self.pending.record(LedgerEvent::transferred(from, to, amount));
        Ok(())
    }

    /// New balances of both sides, without touching any account.
    fn transfer_balances(
        &self,
        from: MemberId,
        to: MemberId,
        amount: MoneyAmount,
        reject_zero: bool,
    ) -> Result<(MoneyAmount, MoneyAmount), FinanceError> {
        let source = self
            .account(from)
            .ok_or(FinanceError::SourceAccountNotFound(from))?;
        let target = self
            .account(to)
            .ok_or(FinanceError::TargetAccountNotFound(to))?;

        if reject_zero && amount.is_zero() {
            return Err(FinanceError::ZeroAmount);
        }
        if from == to {
            return Err(FinanceError::SelfTransfer(from));
        }

        let source_balance = source.balance().checked_sub(amount).ok_or(
            FinanceError::InsufficientFundsForTransfer {
                balance: source.balance(),
                requested: amount,
            },
        )?;
        let target_balance = target
            .balance()
            .checked_add(amount)
            .ok_or(FinanceError::BalanceOverflow(to))?;

        Ok((source_balance, target_balance))
    }

    fn set_balance(&mut self, owner: MemberId, balance: MoneyAmount) -> Result<(), FinanceError> {
        let account = self
            .accounts
            .get_mut(&owner)
            .ok_or(FinanceError::AccountNotFound(owner))?;
        account.set_balance(balance);
        Ok(())
    }

    fn account_for_replay(&mut self, owner: MemberId) -> Result<&mut Account, FinanceError> {
        self.accounts
            .get_mut(&owner)
            .ok_or(FinanceError::AccountNotFound(owner))
    }
}

impl EventsSource for Accounts {
    type Event = LedgerEvent;
    type Error = FinanceError;

    /// Child accounts first (ordered by owner), then the collection's own events.
    fn pending_events(&self) -> Vec<LedgerEvent> {
        self.accounts
            .values()
            .flat_map(|a| a.pending_events())
            .chain(self.pending.as_slice().iter().cloned())
            .collect()
    }

    fn take_pending_events(&mut self) -> Vec<LedgerEvent> {
        let mut events: Vec<LedgerEvent> = self
            .accounts
            .values_mut()
            .flat_map(|a| a.take_pending_events())
            .collect();
        events.extend(self.pending.take());
        events
    }

    fn apply(&mut self, event: &LedgerEvent) -> Result<(), FinanceError> {
        match event {
            LedgerEvent::AccountCreated {
                owner,
                initial_balance,
                ..
            } => {
                if self.accounts.contains_key(owner) {
                    return Err(FinanceError::AccountAlreadyExists(*owner));
                }
                self.accounts
                    .insert(*owner, Account::replayed(*owner, *initial_balance));
                Ok(())
            }
            LedgerEvent::Deposited { to, .. } => self.account_for_replay(*to)?.apply(event),
            LedgerEvent::Withdrawn { from, .. } => self.account_for_replay(*from)?.apply(event),
            LedgerEvent::Transferred { from, to, amount, .. } => {
                // Stored transfers are replayed even if their amount is zero.
                let (source_balance, target_balance) =
                    self.transfer_balances(*from, *to, *amount, false)?;
                self.set_balance(*from, source_balance)?;
                self.set_balance(*to, target_balance)
            }
        }
    }
}
