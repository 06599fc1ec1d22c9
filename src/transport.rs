//! Wayland transport: connection, event queue, registry handshake.
//!
//! Owns the `Connection` and the adapter's `EventQueue`. The adapter
//! state `S` is passed in on every dispatch so that listener callbacks
//! can mutate it; the transport itself holds no adapter state.

use std::io::ErrorKind;
use std::time::Duration;

use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use wayland_client::backend::WaylandError;
use wayland_client::protocol::wl_registry::WlRegistry;
use wayland_client::{Connection, Dispatch, DispatchError, EventQueue};

use crate::error::AdapterError;

/// An open connection plus the event queue the adapter's listeners live on.
pub struct Transport<S> {
    conn: Connection,
    queue: EventQueue<S>,
}

impl<S: 'static> Transport<S> {
    /// Open the connection named by the session environment.
    ///
    /// Fails with `NoTransport` when there is no compositor to talk to,
    /// which is expected outside a Wayland session.
    pub fn connect() -> Result<Self, AdapterError> {
        let conn = Connection::connect_to_env()
            .map_err(|e| AdapterError::NoTransport(e.to_string()))?;
        tracing::debug!("connected to Wayland display");
        Ok(Self::with_connection(conn))
    }

    /// Use an already-open connection. The adapter gets its own event
    /// queue on it.
    pub fn with_connection(conn: Connection) -> Self {
        let queue = conn.new_event_queue();
        Self { conn, queue }
    }

    /// Subscribe to the registry and wait until every global the
    /// compositor announces at connection time has been dispatched.
    ///
    /// One pass over already-queued events, then one round-trip. Binding
    /// happens in the state's `Dispatch<WlRegistry, ()>` impl.
    pub fn resolve(&mut self, state: &mut S) -> Result<(), AdapterError>
    where
        S: Dispatch<WlRegistry, ()>,
    {
        let qh = self.queue.handle();
        // Globals keep arriving on the queue after the handle is dropped;
        // `wl_registry` has no destructor request.
        let _registry = self.conn.display().get_registry(&qh, ());

        self.queue.dispatch_pending(state).map_err(dispatch_error)?;
        self.queue.roundtrip(state).map_err(dispatch_error)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Dispatch events already read from the socket, without blocking.
    pub fn dispatch_pending(&mut self, state: &mut S) -> Result<usize, AdapterError> {
        let dispatched = self.queue.dispatch_pending(state).map_err(dispatch_error)?;
        self.flush()?;
        Ok(dispatched)
    }

    /// Flush outgoing requests, wait up to `timeout` for the socket to
    /// become readable, read, and dispatch.
    ///
    /// Returns the number of events dispatched; `0` on timeout or when
    /// the poll was interrupted by a signal.
    pub fn dispatch_timeout(
        &mut self,
        state: &mut S,
        timeout: Duration,
    ) -> Result<usize, AdapterError> {
        let pending = self.queue.dispatch_pending(state).map_err(dispatch_error)?;
        if pending > 0 {
            self.flush()?;
            return Ok(pending);
        }

        self.flush()?;

        // `None` means events were queued by another reader in the
        // meantime; dispatch them instead of polling.
        let Some(guard) = self.queue.prepare_read() else {
            return self.dispatch_pending(state);
        };

        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let ready = {
            let mut fds = [PollFd::new(guard.connection_fd(), PollFlags::POLLIN)];
            poll(&mut fds, PollTimeout::from(millis))
        };

        match ready {
            Ok(0) => return Ok(0),
            Ok(_) => match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(AdapterError::Dispatch(e.to_string())),
            },
            Err(nix::Error::EINTR) => return Ok(0),
            Err(e) => return Err(AdapterError::Io(e.into())),
        }

        self.dispatch_pending(state)
    }

    pub fn flush(&self) -> Result<(), AdapterError> {
        self.conn
            .flush()
            .map_err(|e| AdapterError::Dispatch(format!("flush: {e}")))
    }

    /// Send any final destroy requests and drop the connection.
    ///
    /// Best-effort: a dead connection has nothing left to release.
    pub fn close(self) {
        if let Err(e) = self.flush() {
            tracing::debug!(error = %e, "flush before disconnect failed");
        }
        tracing::debug!("disconnected from Wayland display");
    }
}

fn dispatch_error(e: DispatchError) -> AdapterError {
    AdapterError::Dispatch(e.to_string())
}
