use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use klabis_core::{MemberId, MoneyAmount};
use klabis_events::Event;

/// Facts recorded by finance accounts.
///
/// Balances are never stored; they are the fold of these events in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    AccountCreated {
        owner: MemberId,
        initial_balance: MoneyAmount,
        occurred_at: DateTime<Utc>,
    },
    Deposited {
        to: MemberId,
        amount: MoneyAmount,
        occurred_at: DateTime<Utc>,
    },
    Withdrawn {
        from: MemberId,
        amount: MoneyAmount,
        occurred_at: DateTime<Utc>,
    },
    Transferred {
        from: MemberId,
        to: MemberId,
        amount: MoneyAmount,
        occurred_at: DateTime<Utc>,
    },
}

impl LedgerEvent {
    pub fn account_created(owner: MemberId, initial_balance: MoneyAmount) -> Self {
        Self::AccountCreated {
            owner,
            initial_balance,
            occurred_at: Utc::now(),
        }
    }

    pub fn deposited(to: MemberId, amount: MoneyAmount) -> Self {
        Self::Deposited {
            to,
            amount,
            occurred_at: Utc::now(),
        }
    }

    pub fn withdrawn(from: MemberId, amount: MoneyAmount) -> Self {
        Self::Withdrawn {
            from,
            amount,
            occurred_at: Utc::now(),
        }
    }

    pub fn transferred(from: MemberId, to: MemberId, amount: MoneyAmount) -> Self {
        Self::Transferred {
            from,
            to,
            amount,
            occurred_at: Utc::now(),
        }
    }

    /// Whether the event changes the account of `member`.
    pub fn concerns(&self, member: MemberId) -> bool {
        match self {
            LedgerEvent::AccountCreated { owner, .. } => *owner == member,
            LedgerEvent::Deposited { to, .. } => *to == member,
            LedgerEvent::Withdrawn { from, .. } => *from == member,
            LedgerEvent::Transferred { from, to, .. } => *from == member || *to == member,
        }
    }

    pub fn amount(&self) -> MoneyAmount {
        match self {
            LedgerEvent::AccountCreated { initial_balance, .. } => *initial_balance,
            LedgerEvent::Deposited { amount, .. }
            | LedgerEvent::Withdrawn { amount, .. }
            | LedgerEvent::Transferred { amount, .. } => *amount,
        }
    }
}

impl Event for LedgerEvent {
    const AGGREGATE_TYPE: &'static str = "finance.account";

    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::AccountCreated { .. } => "finance.account.created",
            LedgerEvent::Deposited { .. } => "finance.account.deposited",
            LedgerEvent::Withdrawn { .. } => "finance.account.withdrawn",
            LedgerEvent::Transferred { .. } => "finance.account.transferred",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::AccountCreated { occurred_at, .. }
            | LedgerEvent::Deposited { occurred_at, .. }
            | LedgerEvent::Withdrawn { occurred_at, .. }
            | LedgerEvent::Transferred { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_concerns_both_sides_only() {
        let ev = LedgerEvent::transferred(MemberId::new(1), MemberId::new(2), MoneyAmount::of(5));
        assert!(ev.concerns(MemberId::new(1)));
        assert!(ev.concerns(MemberId::new(2)));
        assert!(!ev.concerns(MemberId::new(3)));
    }

    #[test]
    fn payload_is_tagged_json() {
        let ev = LedgerEvent::deposited(MemberId::new(4), MoneyAmount::new(250));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "deposited");
        assert_eq!(json["to"], 4);
        assert_eq!(json["amount"], 250);

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
