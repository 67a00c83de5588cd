//! Finance application services.
//!
//! `Ledger` is the write path shared by everything that changes balances:
//! rebuild all accounts from the log, decide, append the pending events with
//! the log version the decision was based on. Losing a concurrency race
//! restarts the cycle.

pub mod accounts;
pub mod ledger;
pub mod transfer;

use thiserror::Error;

use klabis_auth::AuthzError;
use klabis_core::DomainError;
use klabis_finance::FinanceError;

use crate::repository::RepositoryError;

pub use accounts::{AccountsService, DepositAction};
pub use ledger::Ledger;
pub use transfer::TransferMoneyUseCase;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error(transparent)]
    Finance(#[from] FinanceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("ledger kept changing concurrently, gave up after {attempts} attempts")]
    ConcurrencyRetriesExhausted { attempts: u32 },
}

impl From<ServiceError> for DomainError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Unauthorized(e) => e.into(),
            ServiceError::Finance(e) => e.into(),
            ServiceError::Repository(RepositoryError::Domain(e)) => e,
            ServiceError::Repository(e) => DomainError::InvariantViolation(e.to_string()),
            e @ ServiceError::ConcurrencyRetriesExhausted { .. } => DomainError::Conflict(e.to_string()),
        }
    }
}
