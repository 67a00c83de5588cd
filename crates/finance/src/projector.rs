use klabis_core::MemberId;
use klabis_events::{EventEnvelope, EventsSource, Projector};

use crate::account::fold;
use crate::{Account, Accounts, FinanceError, LedgerEvent};

/// Rebuilds the account of one member. Events of other members are skipped.
///
/// `Ok(None)` from `result` means the log never created the account.
#[derive(Debug, Clone)]
pub struct AccountProjector {
    owner: MemberId,
    account: Option<Account>,
}

impl AccountProjector {
    pub fn new(owner: MemberId) -> Self {
        Self {
            owner,
            account: None,
        }
    }
}

impl Projector for AccountProjector {
    type Ev = LedgerEvent;
    type Output = Account;
    type Error = FinanceError;

    fn project(&mut self, envelope: &EventEnvelope<LedgerEvent>) -> Result<(), FinanceError> {
        fold(self.owner, &mut self.account, envelope.payload())
    }

    fn completed(&mut self) {
        if let Some(account) = self.account.as_mut() {
            account.clear_pending_events();
        }
    }

    fn result(self) -> Result<Option<Account>, FinanceError> {
        Ok(self.account)
    }
}

/// Rebuilds every account in the log.
#[derive(Debug, Clone, Default)]
pub struct AccountsProjector {
    accounts: Accounts,
}

impl AccountsProjector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Projector for AccountsProjector {
    type Ev = LedgerEvent;
    type Output = Accounts;
    type Error = FinanceError;

    fn project(&mut self, envelope: &EventEnvelope<LedgerEvent>) -> Result<(), FinanceError> {
        self.accounts.apply(envelope.payload())
    }

    fn completed(&mut self) {
        self.accounts.clear_pending_events();
    }

    fn result(self) -> Result<Option<Accounts>, FinanceError> {
        Ok(Some(self.accounts))
    }
}
