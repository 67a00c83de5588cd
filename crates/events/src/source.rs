//! Event sources: aggregates that record what happened while they mutate.
//!
//! A source has two ways of changing state:
//!
//! - **Mutators** (`deposit`, `withdraw`, ...) validate, change state and
//!   record the resulting event as *pending*.
//! - **`apply`** replays an event that is already in the log. Nothing is
//!   recorded, so rebuilding a source never produces new events.
//!
//! The repository appends the pending events and only then drains them with
//! `take_pending_events`; a failed append leaves them in place.
//!
//! Composite sources (a collection of child sources plus events of their own)
//! report the children's pending events first, in child order, followed by
//! their own.

/// Aggregate that buffers pending events and can replay stored ones.
pub trait EventsSource {
    type Event: Clone;
    type Error: core::fmt::Debug;

    /// Events recorded since the last drain, oldest first.
    fn pending_events(&self) -> Vec<Self::Event>;

    /// Drain the pending events.
    fn take_pending_events(&mut self) -> Vec<Self::Event>;

    fn clear_pending_events(&mut self) {
        let _ = self.take_pending_events();
    }

    fn has_pending_events(&self) -> bool {
        !self.pending_events().is_empty()
    }

    /// Replay a stored event without recording it.
    fn apply(&mut self, event: &Self::Event) -> Result<(), Self::Error>;
}

/// Buffer of pending events for a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvents<E> {
    events: Vec<E>,
}

impl<E> PendingEvents<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<E> Default for PendingEvents<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        value: i64,
        pending: PendingEvents<i64>,
    }

    impl Counter {
        fn add(&mut self, delta: i64) {
            self.value += delta;
            self.pending.record(delta);
        }
    }

    impl EventsSource for Counter {
        type Event = i64;
        type Error = core::convert::Infallible;

        fn pending_events(&self) -> Vec<i64> {
            self.pending.as_slice().to_vec()
        }

        fn take_pending_events(&mut self) -> Vec<i64> {
            self.pending.take()
        }

        fn apply(&mut self, event: &i64) -> Result<(), Self::Error> {
            self.value += event;
            Ok(())
        }
    }

    #[test]
    fn mutators_record_and_replay_does_not() {
        let mut c = Counter::default();
        c.apply(&5).unwrap();
        assert!(!c.has_pending_events());

        c.add(3);
        assert_eq!(c.value, 8);
        assert_eq!(c.pending_events(), vec![3]);

        assert_eq!(c.take_pending_events(), vec![3]);
        assert!(!c.has_pending_events());
    }

    #[test]
    fn clear_drops_pending() {
        let mut c = Counter::default();
        c.add(1);
        c.add(2);
        assert_eq!(c.pending.len(), 2);

        c.clear_pending_events();
        assert!(c.pending.is_empty());
        assert_eq!(c.value, 3);
    }
}
