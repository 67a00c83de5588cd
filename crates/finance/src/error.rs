use thiserror::Error;

use klabis_core::{DomainError, MemberId, MoneyAmount};

/// Finance rule violations. A failed operation never leaves partial changes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FinanceError {
    #[error("insufficient money to withdraw (balance {balance}, requested {requested})")]
    InsufficientFunds {
        balance: MoneyAmount,
        requested: MoneyAmount,
    },

    #[error("insufficient funds on source account (balance {balance}, requested {requested})")]
    InsufficientFundsForTransfer {
        balance: MoneyAmount,
        requested: MoneyAmount,
    },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("source account not found (member {0})")]
    SourceAccountNotFound(MemberId),

    #[error("target account not found (member {0})")]
    TargetAccountNotFound(MemberId),

    #[error("account for member {0} not found")]
    AccountNotFound(MemberId),

    #[error("account for member {0} already exists")]
    AccountAlreadyExists(MemberId),

    #[error("cannot transfer money within the account of member {0}")]
    SelfTransfer(MemberId),

    #[error("balance overflow on account of member {0}")]
    BalanceOverflow(MemberId),

    #[error("event {event_type} does not concern account of member {owner}")]
    ForeignEvent {
        owner: MemberId,
        event_type: &'static str,
    },
}

impl From<FinanceError> for DomainError {
    fn from(value: FinanceError) -> Self {
        let msg = value.to_string();
        match value {
            FinanceError::ZeroAmount | FinanceError::SelfTransfer(_) => DomainError::Validation(msg),
            FinanceError::SourceAccountNotFound(_)
            | FinanceError::TargetAccountNotFound(_)
            | FinanceError::AccountNotFound(_) => DomainError::NotFound(msg),
            FinanceError::AccountAlreadyExists(_) => DomainError::Conflict(msg),
            FinanceError::InsufficientFunds { .. }
            | FinanceError::InsufficientFundsForTransfer { .. }
            | FinanceError::BalanceOverflow(_)
            | FinanceError::ForeignEvent { .. } => DomainError::InvariantViolation(msg),
        }
    }
}
