//! In-process wiring of the finance module.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use klabis_events::{BusMessage, EventBus, InMemoryBusError, InMemoryEventBus, IntegrationEvent};

use crate::config::FinanceConfig;
use crate::event_store::{InMemoryEventStore, PublishingEventStore};
use crate::listener::FinanceEventsListener;
use crate::projections::AccountBalancesProjection;
use crate::repository::EventsRepository;
use crate::service::{AccountsService, Ledger};
use crate::workers::{FinanceWorker, WorkerHandle};

pub type InMemoryBus = Arc<InMemoryEventBus<BusMessage>>;
pub type InMemoryStore = PublishingEventStore<InMemoryEventStore, InMemoryBus>;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to publish on the event bus: {0}")]
    Bus(#[from] InMemoryBusError),
}

/// Finance module running on an in-memory log and bus.
///
/// Two workers follow the bus: one runs `FinanceEventsListener` on integration
/// events, the other keeps `AccountBalancesProjection` up to date.
pub struct FinanceServices {
    pub config: FinanceConfig,
    pub bus: InMemoryBus,
    pub repository: Arc<EventsRepository<InMemoryStore>>,
    pub ledger: Ledger<InMemoryStore>,
    pub accounts: AccountsService<InMemoryStore>,
    pub balances: Arc<AccountBalancesProjection>,
    workers: Vec<WorkerHandle>,
}

impl FinanceServices {
    pub fn in_memory(config: FinanceConfig) -> Result<Self, WiringError> {
        let bus: InMemoryBus = Arc::new(InMemoryEventBus::new());
        let store = PublishingEventStore::new(InMemoryEventStore::new(), Arc::clone(&bus));
        let repository = Arc::new(EventsRepository::new(store));

        let ledger = Ledger::new(Arc::clone(&repository), config.max_retries);
        let accounts = AccountsService::new(ledger.clone(), config.max_page_size);
        let balances = Arc::new(AccountBalancesProjection::new());

        let listener = FinanceEventsListener::new(ledger.clone(), config.opening_balance);
        let listener_worker = FinanceWorker::spawn(
            "finance-listener",
            bus.as_ref(),
            config.worker_tick,
            move |msg: BusMessage| listener.on_message(msg),
        )?;

        let projection = Arc::clone(&balances);
        let log = Arc::clone(&repository);
        let balances_worker = match FinanceWorker::spawn(
            "finance-balances",
            bus.as_ref(),
            config.worker_tick,
            move |msg: BusMessage| projection.on_message(msg, log.store()),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                listener_worker.shutdown();
                return Err(err.into());
            }
        };

        info!(opening_balance = %config.opening_balance, "finance services started");
        Ok(Self {
            config,
            bus,
            repository,
            ledger,
            accounts,
            balances,
            workers: vec![listener_worker, balances_worker],
        })
    }

    /// Feed an event raised by another club module into the finance workers.
    pub fn publish_integration(&self, event: IntegrationEvent) -> Result<(), WiringError> {
        self.bus.publish(BusMessage::Integration(event))?;
        Ok(())
    }

    /// Stop the workers after they handled what was already delivered.
    pub fn shutdown(self) {
        for worker in self.workers {
            worker.shutdown();
        }
        info!("finance services stopped");
    }
}
