//! Infrastructure layer of the finance module: event log, repository,
//! application services, bus workers and read models.

pub mod config;
pub mod event_store;
pub mod listener;
pub mod projections;
pub mod repository;
pub mod service;
pub mod services;
pub mod workers;

pub use config::FinanceConfig;
pub use listener::FinanceEventsListener;
pub use repository::{EventsRepository, RepositoryError};
pub use service::{AccountsService, DepositAction, Ledger, ServiceError, TransferMoneyUseCase};
pub use services::{FinanceServices, WiringError};
