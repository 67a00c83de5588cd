//! Event-sourcing micro-framework shared by the club modules.
//!
//! - `Event` / `EventEnvelope`: typed facts and their position in the log
//! - `EventsSource`: aggregates that record pending events while mutating
//! - `Projector` / `ProjectionRunner`: fold the log into a result
//! - `EventBus`: fan-out of committed and integration events

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod integration;
pub mod message;
pub mod projector;
pub mod runner;
pub mod source;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use integration::IntegrationEvent;
pub use message::BusMessage;
pub use projector::Projector;
pub use runner::{ProjectionError, ProjectionRunner};
pub use source::{EventsSource, PendingEvents};
