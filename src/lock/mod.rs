//! Session lock adapter: `ext-session-lock-v1` without lock surfaces.
//!
//! Requests and releases the compositor's exclusive "locked" state. No
//! lock surface is ever created; whatever the compositor shows while
//! locked is its own business.

mod state;
mod wayland;

use std::time::Duration;

use wayland_client::Connection;

pub use state::{Confirmation, LockHandle, LockManager, LockState};

use crate::error::AdapterError;
use crate::transport::Transport;
use wayland::WaylandLockState;

/// Session lock adapter bound to one Wayland connection.
///
/// Dropping the adapter tears it down like [`SessionLock::fini`],
/// which lifts a confirmed lock.
pub struct SessionLock {
    state: WaylandLockState,
    transport: Option<Transport<WaylandLockState>>,
}

impl SessionLock {
    pub fn new() -> Self {
        Self {
            state: LockState::new(),
            transport: None,
        }
    }

    /// Connect and bind `ext_session_lock_manager_v1`.
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
        open: impl FnOnce() -> Result<Transport<WaylandLockState>, AdapterError>,
    ) -> Result<(), AdapterError> {
        if self.transport.is_some() {
            return Err(AdapterError::AlreadyInitialized);
        }

        match self.try_init(open) {
            Ok(()) => {
                tracing::info!("session lock initialized");
                Ok(())
            }
            Err(e) => {
                if e.is_unsupported() {
                    tracing::warn!(error = %e, "session lock unavailable");
                } else {
                    tracing::error!(error = %e, "session lock init failed");
                }
                self.fini();
                Err(e)
            }
        }
    }

    fn try_init(
        &mut self,
        open: impl FnOnce() -> Result<Transport<WaylandLockState>, AdapterError>,
    ) -> Result<(), AdapterError> {
        let transport = self.transport.insert(open()?);
        transport.resolve(&mut self.state)?;
        self.state.check_resolved()
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// Set the callback receiving `true` once the compositor confirms the
    /// lock and `false` when it is released, by [`unlock`](Self::unlock)
    /// or by the compositor.
    pub fn set_callback(&mut self, f: impl FnMut(bool) + 'static) {
        self.state.set_callback(f);
    }

    pub fn clear_callback(&mut self) {
        self.state.clear_callback();
    }

    /// Request the session lock. Confirmation arrives through the
    /// callback while the connection is dispatched.
    pub fn lock(&mut self) {
        self.state.lock();
        self.flush();
    }

    pub fn unlock(&mut self) {
        self.state.unlock();
        self.flush();
    }

    /// Whether the compositor has confirmed the current lock.
    pub fn is_locked(&self) -> bool {
        self.state.confirmation() == Confirmation::Locked
    }

    /// Whether a lock was requested and not yet confirmed.
    pub fn is_pending(&self) -> bool {
        self.state.confirmation() == Confirmation::Requested
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.transport.as_ref().map(Transport::connection)
    }

    pub fn dispatch_pending(&mut self) -> Result<usize, AdapterError> {
        let transport = self.transport.as_mut().ok_or(AdapterError::NotInitialized)?;
        transport.dispatch_pending(&mut self.state)
    }

    pub fn dispatch_timeout(&mut self, timeout: Duration) -> Result<usize, AdapterError> {
        let transport = self.transport.as_mut().ok_or(AdapterError::NotInitialized)?;
        transport.dispatch_timeout(&mut self.state, timeout)
    }

    /// Release the lock (cooperatively if confirmed), the manager and the
    /// connection, and clear the callback. The callback is not invoked.
    pub fn fini(&mut self) {
        self.state.release();
        if let Some(transport) = self.transport.take() {
            transport.close();
            tracing::info!("session lock shut down");
        }
    }

    fn flush(&self) {
        if let Some(transport) = &self.transport
            && let Err(e) = transport.flush()
        {
            tracing::debug!(error = %e, "flush failed");
        }
    }
}

impl Default for SessionLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.fini();
    }
}
