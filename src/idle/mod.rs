//! Idle notification adapter: `ext-idle-notify-v1`.
//!
//! Reports when the user has been inactive for a configured number of
//! seconds. The caller owns the event loop: after [`IdleNotify::init`]
//! it either drives the connection itself (see
//! [`IdleNotify::connection`] and [`IdleNotify::dispatch_pending`]) or
//! calls [`IdleNotify::dispatch_timeout`] in a loop.

mod state;
mod wayland;

use std::time::Duration;

use wayland_client::Connection;

pub use state::{IdleNotification, IdleNotifier, IdleState, SeatHandle, timeout_ms};

use crate::error::AdapterError;
use crate::transport::Transport;
use wayland::WaylandIdleState;

/// Idle notification adapter bound to one Wayland connection.
///
/// Dropping the adapter tears it down like [`IdleNotify::fini`].
pub struct IdleNotify {
    state: WaylandIdleState,
    transport: Option<Transport<WaylandIdleState>>,
}

impl IdleNotify {
    pub fn new() -> Self {
        Self {
            state: IdleState::new(),
            transport: None,
        }
    }

    /// Connect and bind `ext_idle_notifier_v1` and `wl_seat`.
    ///
    /// On failure everything acquired so far is released again
    /// (including the callback), leaving the adapter as if new.
    pub fn init(&mut self) -> Result<(), AdapterError> {
        self.start(Transport::connect)
    }

    /// Like [`init`](Self::init), on a connection the caller already
    /// holds, e.g. one shared with a toolkit.
    pub fn init_with(&mut self, conn: Connection) -> Result<(), AdapterError> {
        self.start(|| Ok(Transport::with_connection(conn)))
    }

    fn start(
        &mut self,
        open: impl FnOnce() -> Result<Transport<WaylandIdleState>, AdapterError>,
    ) -> Result<(), AdapterError> {
        if self.transport.is_some() {
            return Err(AdapterError::AlreadyInitialized);
        }

        match self.try_init(open) {
            Ok(()) => {
                tracing::info!("idle notify initialized");
                Ok(())
            }
            Err(e) => {
                if e.is_unsupported() {
                    tracing::warn!(error = %e, "idle notify unavailable");
                } else {
                    tracing::error!(error = %e, "idle notify init failed");
                }
                self.fini();
                Err(e)
            }
        }
    }

    fn try_init(
        &mut self,
        open: impl FnOnce() -> Result<Transport<WaylandIdleState>, AdapterError>,
    ) -> Result<(), AdapterError> {
        let transport = self.transport.insert(open()?);
        transport.resolve(&mut self.state)?;
        self.state.check_resolved()
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// Set the callback invoked when the idle timeout is reached.
    ///
    /// Replaces any previous callback and stays registered across
    /// [`set_timeout`](Self::set_timeout) calls until cleared or
    /// [`fini`](Self::fini).
    pub fn set_callback(&mut self, f: impl FnMut() + 'static) {
        self.state.set_callback(f);
    }

    pub fn clear_callback(&mut self) {
        self.state.clear_callback();
    }

    /// Set the idle timeout in seconds, restarting the countdown.
    /// `0` disables notifications.
    pub fn set_timeout(&mut self, seconds: u32) {
        self.state.set_timeout(seconds);
        if let Some(transport) = &self.transport
            && let Err(e) = transport.flush()
        {
            tracing::debug!(error = %e, "flush after set_timeout failed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state.is_armed()
    }

    /// The underlying connection, for callers integrating the socket
    /// into their own event loop.
    pub fn connection(&self) -> Option<&Connection> {
        self.transport.as_ref().map(Transport::connection)
    }

    /// Dispatch already-read events without blocking.
    pub fn dispatch_pending(&mut self) -> Result<usize, AdapterError> {
        let transport = self.transport.as_mut().ok_or(AdapterError::NotInitialized)?;
        transport.dispatch_pending(&mut self.state)
    }

    /// Wait up to `timeout` for events and dispatch them.
    pub fn dispatch_timeout(&mut self, timeout: Duration) -> Result<usize, AdapterError> {
        let transport = self.transport.as_mut().ok_or(AdapterError::NotInitialized)?;
        transport.dispatch_timeout(&mut self.state, timeout)
    }

    /// Release the notification, notifier, seat and connection, in that
    /// order, and clear the callback. Safe to call at any time.
    pub fn fini(&mut self) {
        self.state.release();
        if let Some(transport) = self.transport.take() {
            transport.close();
            tracing::info!("idle notify shut down");
        }
    }
}

impl Default for IdleNotify {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IdleNotify {
    fn drop(&mut self) {
        self.fini();
    }
}
