//! Background workers fed by the event bus.

pub mod finance_worker;

pub use finance_worker::{FinanceWorker, WorkerHandle};
