//! Finance module: member accounts computed by replaying ledger events.
//!
//! Pure domain logic only: no IO, no persistence concerns. Storage and
//! publication of the events live in `klabis-infra`.

pub mod account;
pub mod accounts;
pub mod error;
pub mod event;
pub mod history;
pub mod projector;

pub use account::{Account, rebuild};
pub use accounts::Accounts;
pub use error::FinanceError;
pub use event::LedgerEvent;
pub use history::{TransactionHistory, TransactionItem, TransactionKind};
pub use projector::{AccountProjector, AccountsProjector};
