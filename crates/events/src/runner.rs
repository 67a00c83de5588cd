//! Projection runner utilities.
//!
//! Results built by projectors are **disposable**; the log is the source of
//! truth. The runner provides deterministic replay and cursor tracking
//! without making storage assumptions.

use thiserror::Error;

use crate::{EventEnvelope, Projector};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError<E: core::fmt::Debug> {
    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error("projector rejected event: {0:?}")]
    Projector(E),
}

/// Runs envelopes through a projector and tracks the last applied position.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projector,
{
    projector: P,
    last_sequence_number: Option<u64>,
}

impl<P> ProjectionRunner<P>
where
    P: Projector,
{
    pub fn new(projector: P) -> Self {
        Self {
            projector,
            last_sequence_number: None,
        }
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Sequence number of the last applied envelope (if any).
    pub fn last_sequence_number(&self) -> Option<u64> {
        self.last_sequence_number
    }

    /// Apply a single envelope, enforcing strictly increasing sequence numbers.
    pub fn apply(&mut self, envelope: &EventEnvelope<P::Ev>) -> Result<(), ProjectionError<P::Error>> {
        let found = envelope.sequence_number();

        if let Some(last) = self.last_sequence_number {
            if found <= last {
                return Err(ProjectionError::NonMonotonicSequence { last, found });
            }
        }

        self.projector
            .project(envelope)
            .map_err(ProjectionError::Projector)?;
        self.last_sequence_number = Some(found);
        Ok(())
    }

    /// Apply many envelopes in order.
    pub fn run<'a>(
        &mut self,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<(), ProjectionError<P::Error>>
    where
        P::Ev: 'a,
    {
        for env in envelopes {
            self.apply(env)?;
        }
        Ok(())
    }

    /// Signal completion and hand out the projector's result.
    pub fn finish(mut self) -> Result<Option<P::Output>, ProjectionError<P::Error>> {
        self.projector.completed();
        self.projector.result().map_err(ProjectionError::Projector)
    }

    /// Rebuild from scratch by replaying the full history into a fresh projector.
    pub fn rebuild_from_scratch<'a>(
        factory: impl FnOnce() -> P,
        envelopes: impl IntoIterator<Item = &'a EventEnvelope<P::Ev>>,
    ) -> Result<Option<P::Output>, ProjectionError<P::Error>>
    where
        P::Ev: 'a,
    {
        let mut runner = ProjectionRunner::new(factory());
        runner.run(envelopes)?;
        runner.finish()
    }
}
