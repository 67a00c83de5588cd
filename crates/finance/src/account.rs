//! A single member's finance account.

use tracing::debug;

use klabis_core::{AggregateRoot, MemberId, MoneyAmount};
use klabis_events::{Event, EventsSource, PendingEvents};

use crate::{FinanceError, LedgerEvent};

/// Account of one member.
///
/// Invariants:
/// - exactly one account per member
/// - the balance is never negative and never overflows
/// - failed operations leave balance, version and pending events untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    owner: MemberId,
    balance: MoneyAmount,
    version: u64,
    pending: PendingEvents<LedgerEvent>,
}

impl Account {
    /// Open a new account and record `AccountCreated`.
    ///
    /// The initial balance travels inside the creation event; no separate
    /// deposit is recorded for it.
    pub fn open(owner: MemberId, initial_balance: MoneyAmount) -> Self {
        let mut account = Self::replayed(owner, initial_balance);
        account
            .pending
            .record(LedgerEvent::account_created(owner, initial_balance));
        account
    }

    /// State right after a stored `AccountCreated` was replayed.
    pub(crate) fn replayed(owner: MemberId, initial_balance: MoneyAmount) -> Self {
        Self {
            owner,
            balance: initial_balance,
            version: 1,
            pending: PendingEvents::new(),
        }
    }

    pub fn owner(&self) -> MemberId {
        self.owner
    }

    pub fn balance(&self) -> MoneyAmount {
        self.balance
    }

    pub fn deposit(&mut self, amount: MoneyAmount) -> Result<(), FinanceError> {
        if amount.is_zero() {
            return Err(FinanceError::ZeroAmount);
        }
        self.credit(amount)?;
        self.pending.record(LedgerEvent::deposited(self.owner, amount));
        Ok(())
    }

    /// A withdrawal of `amount` leaves a non-negative balance.
    pub fn can_withdraw(&self, amount: MoneyAmount) -> bool {
        !self.balance.is_lower_than(amount)
    }

    pub fn withdraw(&mut self, amount: MoneyAmount) -> Result<(), FinanceError> {
        if amount.is_zero() {
            return Err(FinanceError::ZeroAmount);
        }
        self.debit(amount)?;
        self.pending.record(LedgerEvent::withdrawn(self.owner, amount));
        Ok(())
    }

    /// Charge the entry fee of a sport event. A zero fee changes nothing.
    pub fn register_payment_for_event(&mut self, cost: MoneyAmount) -> Result<(), FinanceError> {
        if cost.is_zero() {
            debug!(owner = %self.owner, "free event, no payment recorded");
            return Ok(());
        }
        self.withdraw(cost)
    }

    /// Return the entry fee of a cancelled registration. A zero fee changes nothing.
    pub fn refund_event(&mut self, cost: MoneyAmount) -> Result<(), FinanceError> {
        if cost.is_zero() {
            debug!(owner = %self.owner, "free event, no refund recorded");
            return Ok(());
        }
        self.deposit(cost)
    }

    fn credit(&mut self, amount: MoneyAmount) -> Result<(), FinanceError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(FinanceError::BalanceOverflow(self.owner))?;
        self.set_balance(balance);
        Ok(())
    }

    fn debit(&mut self, amount: MoneyAmount) -> Result<(), FinanceError> {
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(FinanceError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            })?;
        self.set_balance(balance);
        Ok(())
    }

    /// Every accepted change (recorded or replayed) bumps the version.
    pub(crate) fn set_balance(&mut self, balance: MoneyAmount) {
        self.balance = balance;
        self.version += 1;
    }
}

impl AggregateRoot for Account {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.owner
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl EventsSource for Account {
    type Event = LedgerEvent;
    type Error = FinanceError;

    fn pending_events(&self) -> Vec<LedgerEvent> {
        self.pending.as_slice().to_vec()
    }

    fn take_pending_events(&mut self) -> Vec<LedgerEvent> {
        self.pending.take()
    }

    fn apply(&mut self, event: &LedgerEvent) -> Result<(), FinanceError> {
        if !event.concerns(self.owner) {
            return Err(FinanceError::ForeignEvent {
                owner: self.owner,
                event_type: event.event_type(),
            });
        }

        match event {
            LedgerEvent::AccountCreated { owner, .. } => Err(FinanceError::AccountAlreadyExists(*owner)),
            LedgerEvent::Deposited { amount, .. } => self.credit(*amount),
            LedgerEvent::Withdrawn { amount, .. } => self.debit(*amount),
            LedgerEvent::Transferred { from, to, amount, .. } => {
                if from == to {
                    Err(FinanceError::SelfTransfer(*from))
                } else if *from == self.owner {
                    self.debit(*amount)
                } else {
                    self.credit(*amount)
                }
            }
        }
    }
}

/// Rebuild the account of `owner` from a slice of the log.
///
/// Events for other members are skipped. Fails with `AccountNotFound` when the
/// log never created the account.
pub fn rebuild<'a>(
    owner: MemberId,
    events: impl IntoIterator<Item = &'a LedgerEvent>,
) -> Result<Account, FinanceError> {
    let mut account: Option<Account> = None;

    for event in events {
        fold(owner, &mut account, event)?;
    }

    account.ok_or(FinanceError::AccountNotFound(owner))
}

/// Fold one event into the (maybe not yet created) account of `owner`.
pub(crate) fn fold(
    owner: MemberId,
    account: &mut Option<Account>,
    event: &LedgerEvent,
) -> Result<(), FinanceError> {
    if !event.concerns(owner) {
        return Ok(());
    }

    match (account.as_mut(), event) {
        (None, LedgerEvent::AccountCreated { initial_balance, .. }) => {
            *account = Some(Account::replayed(owner, *initial_balance));
            Ok(())
        }
        (None, _) => Err(FinanceError::AccountNotFound(owner)),
        (Some(existing), _) => existing.apply(event),
    }
}
