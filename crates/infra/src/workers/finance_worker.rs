use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use klabis_events::{EventBus, Subscription};

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Request graceful shutdown and wait for the worker to stop.
    ///
    /// Messages already delivered to the subscription are handled first.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            if j.join().is_err() {
                warn!(worker = self.name, "worker thread panicked");
            }
        }
    }
}

/// Runs a bus handler on its own thread.
///
/// - subscribes before the thread starts, so nothing published after
///   `spawn` returns is missed
/// - handler failures are logged and do not stop the worker
/// - the handler must tolerate redelivery
#[derive(Debug)]
pub struct FinanceWorker;

impl FinanceWorker {
    pub fn spawn<M, B, H, E>(
        name: &'static str,
        bus: &B,
        tick: Duration,
        mut handler: H,
    ) -> io::Result<WorkerHandle>
    where
        M: Send + 'static,
        B: EventBus<M> + ?Sized,
        H: FnMut(M) -> Result<(), E> + Send + 'static,
        E: core::fmt::Debug,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub: Subscription<M> = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, tick, &mut handler))?;

        debug!(worker = name, "worker started");
        Ok(WorkerHandle {
            name,
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn worker_loop<M, H, E>(
    name: &'static str,
    sub: Subscription<M>,
    shutdown_rx: mpsc::Receiver<()>,
    tick: Duration,
    handler: &mut H,
) where
    H: FnMut(M) -> Result<(), E>,
    E: core::fmt::Debug,
{
    loop {
        match sub.recv_timeout(tick) {
            Ok(msg) => {
                if let Err(err) = handler(msg) {
                    warn!(worker = name, error = ?err, "worker handler failed");
                }
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // Only checked while idle, so queued messages are drained first.
        if shutdown_rx.try_recv().is_ok() {
            break;
        }
    }

    debug!(worker = name, "worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use klabis_events::InMemoryEventBus;

    use super::*;

    #[test]
    fn handles_messages_until_shutdown() {
        let bus = InMemoryEventBus::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = FinanceWorker::spawn("test-worker", &bus, Duration::from_millis(10), move |n: u32| {
            sink.lock().unwrap().push(n);
            if n == 2 { Err("two") } else { Ok(()) }
        })
        .unwrap();

        for n in 1..=3 {
            bus.publish(n).unwrap();
        }
        handle.shutdown();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
