//! Adapter thread: owns one Wayland adapter and pumps its connection.
//!
//! The adapters are single-threaded (`!Send` callbacks), so each one is
//! built and driven on a dedicated thread. Commands arrive over an
//! unbounded channel and are applied between dispatch passes; events
//! leave through the channel handed to the adapter's callback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use lockbridge::AdapterError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;

use super::RunError;

/// Upper bound on how long a stop request or command waits for the
/// dispatch poll to return.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An adapter the pump thread can drive.
pub trait Pumped {
    type Command: Send + 'static;

    fn apply(&mut self, command: Self::Command);
    fn dispatch_timeout(&mut self, timeout: Duration) -> Result<usize, AdapterError>;
    fn fini(&mut self);
}

/// Handle to a running adapter thread.
pub struct AdapterThread<C> {
    commands: UnboundedSender<C>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl<C> AdapterThread<C> {
    pub fn send(&self, command: C) -> Result<(), RunError> {
        self.commands
            .send(command)
            .map_err(|_| RunError::AdapterExited)
    }

    /// Stop the thread and wait for it to tear the adapter down.
    ///
    /// Commands already sent are applied before `fini()`.
    pub fn shutdown(self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Err(e) = self.handle.join() {
            tracing::warn!("adapter thread panicked: {e:?}");
        }
    }
}

/// Spawn an adapter thread.
///
/// `build` runs on the new thread with the sender for adapter events; it
/// must return an initialized adapter. Resolves once `build` has
/// finished, returning its error if initialization failed.
pub async fn spawn<A, E, F>(
    name: &str,
    build: F,
) -> Result<(AdapterThread<A::Command>, UnboundedReceiver<E>), RunError>
where
    A: Pumped,
    E: Send + 'static,
    F: FnOnce(UnboundedSender<E>) -> Result<A, AdapterError> + Send + 'static,
{
    let (event_tx, event_rx) = unbounded_channel();
    let (command_tx, mut command_rx) = unbounded_channel::<A::Command>();
    let (ready_tx, ready_rx) = oneshot::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);

    let handle = std::thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut adapter = match build(event_tx) {
                Ok(adapter) => {
                    let _ = ready_tx.send(Ok(()));
                    adapter
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            while !thread_stop.load(Ordering::Relaxed) {
                while let Ok(command) = command_rx.try_recv() {
                    adapter.apply(command);
                }
                if let Err(e) = adapter.dispatch_timeout(POLL_INTERVAL) {
                    tracing::error!(error = %e, "Wayland dispatch failed");
                    break;
                }
            }

            while let Ok(command) = command_rx.try_recv() {
                adapter.apply(command);
            }
            adapter.fini();
        })?;

    let thread = AdapterThread {
        commands: command_tx,
        stop,
        handle,
    };

    match ready_rx.await {
        Ok(Ok(())) => Ok((thread, event_rx)),
        Ok(Err(e)) => {
            thread.shutdown();
            Err(e.into())
        }
        Err(_) => {
            thread.shutdown();
            Err(RunError::AdapterExited)
        }
    }
}
