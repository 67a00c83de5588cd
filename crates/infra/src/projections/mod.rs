//! Disposable read models built from committed events.

pub mod account_balances;

pub use account_balances::{AccountBalance, AccountBalancesProjection, BalancesProjectionError};
