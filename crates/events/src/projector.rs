use crate::{Event, EventEnvelope};

/// A projector folds the event log into a result (an aggregate, a read model,
/// a report).
///
/// ## Lifecycle
///
/// 1. **Project**: `project()` is called once per event of the projector's
///    stream, in sequence order.
/// 2. **Complete**: `completed()` is called once after the last event. Use it
///    to finalize the result (e.g. drop pending events a replay must not keep).
/// 3. **Result**: `result()` consumes the projector. `Ok(None)` means the log
///    held nothing relevant (e.g. no account was ever created for the owner).
///
/// ## Determinism
///
/// Projectors must be pure functions of the events they are given: replaying
/// the same log twice must yield the same result. No clocks, no IO.
///
/// Use `ProjectionRunner` to drive a projector; it enforces monotonic
/// sequence numbers.
pub trait Projector {
    type Ev: Event;
    type Output;
    type Error: core::fmt::Debug;

    /// Fold a single event into the projection.
    ///
    /// Events that do not concern this projector must be ignored, not rejected.
    fn project(&mut self, envelope: &EventEnvelope<Self::Ev>) -> Result<(), Self::Error>;

    /// Called once after the last event was projected.
    fn completed(&mut self) {}

    fn result(self) -> Result<Option<Self::Output>, Self::Error>;
}
