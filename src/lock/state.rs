//! Session-lock state machine.
//!
//! Tracks the bound lock manager, at most one outstanding lock request
//! and whether the compositor has confirmed it. The confirmation decides
//! how the lock is released: a confirmed lock is ended cooperatively
//! with `unlock_and_destroy`, an unconfirmed one is simply destroyed.

use crate::callback::CallbackSlot;
use crate::error::AdapterError;

/// The bound `ext_session_lock_manager_v1` global.
pub trait LockManager {
    type Lock: LockHandle;

    /// Request a session lock. The returned object already has its
    /// listener installed.
    fn request_lock(&self) -> Self::Lock;

    fn dispose(self);
}

/// A live `ext_session_lock_v1`.
pub trait LockHandle: PartialEq {
    /// Lift a confirmed lock and destroy the object.
    fn unlock(self);

    /// Destroy the object without unlocking.
    fn dispose(self);
}

/// Whether the compositor has acknowledged the current lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// No lock object exists.
    Unlocked,
    /// Lock requested, `locked` not yet received.
    Requested,
    /// The compositor confirmed the lock.
    Locked,
}

/// Module state for one session-lock adapter.
pub struct LockState<M: LockManager> {
    manager: Option<M>,
    current: Option<M::Lock>,
    confirmation: Confirmation,
    callback: CallbackSlot<bool>,
}

impl<M: LockManager> LockState<M> {
    pub fn new() -> Self {
        Self {
            manager: None,
            current: None,
            confirmation: Confirmation::Unlocked,
            callback: CallbackSlot::new(),
        }
    }

    pub fn has_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// Store a freshly bound manager. Only the first one is kept.
    pub fn bind_manager(&mut self, manager: M) {
        if self.manager.is_none() {
            self.manager = Some(manager);
        }
    }

    pub fn check_resolved(&self) -> Result<(), AdapterError> {
        if self.manager.is_none() {
            return Err(AdapterError::CapabilityMissing(
                "ext_session_lock_manager_v1",
            ));
        }
        Ok(())
    }

    /// Set the callback receiving `true` on lock, `false` on unlock.
    pub fn set_callback(&mut self, f: impl FnMut(bool) + 'static) {
        self.callback.set(f);
    }

    pub fn clear_callback(&mut self) {
        self.callback.clear();
    }

    pub fn confirmation(&self) -> Confirmation {
        self.confirmation
    }

    /// Whether a lock request is outstanding or confirmed.
    pub fn has_lock(&self) -> bool {
        self.current.is_some()
    }

    /// Request the lock. No-op while a request is outstanding or when
    /// no manager is bound.
    pub fn lock(&mut self) {
        if self.current.is_some() {
            tracing::debug!(confirmation = ?self.confirmation, "lock already requested");
            return;
        }
        let Some(manager) = self.manager.as_ref() else {
            tracing::debug!("lock manager not bound, ignoring lock request");
            return;
        };

        self.confirmation = Confirmation::Requested;
        self.current = Some(manager.request_lock());
        tracing::info!("session lock requested");
    }

    /// Release the lock and report `false` to the callback. No-op when
    /// no lock exists.
    pub fn unlock(&mut self) {
        if self.release_lock() {
            tracing::info!("session unlocked");
            self.callback.fire(false);
        }
    }

    /// `locked` event: the compositor confirmed the lock.
    pub fn on_locked(&mut self, source: &M::Lock) {
        if self.current.as_ref() != Some(source) {
            tracing::debug!("locked event for a stale lock object");
            return;
        }
        self.confirmation = Confirmation::Locked;
        tracing::info!("session lock confirmed");
        self.callback.fire(true);
    }

    /// `finished` event: the compositor ended the lock (denied it, or
    /// unlocked through other means). Handled like [`unlock`](Self::unlock).
    pub fn on_finished(&mut self, source: &M::Lock) {
        if self.current.as_ref() != Some(source) {
            tracing::debug!("finished event for a stale lock object");
            return;
        }
        tracing::info!(confirmation = ?self.confirmation, "compositor finished the session lock");
        self.unlock();
    }

    /// Destroy the current lock object, cooperatively if confirmed.
    /// Returns whether there was one.
    fn release_lock(&mut self) -> bool {
        let Some(lock) = self.current.take() else {
            return false;
        };
        // A lock object only exists while `Requested` or `Locked`.
        debug_assert_ne!(self.confirmation, Confirmation::Unlocked);
        if self.confirmation == Confirmation::Locked {
            lock.unlock();
        } else {
            lock.dispose();
        }
        self.confirmation = Confirmation::Unlocked;
        true
    }

    /// Release everything: callback, lock, manager.
    ///
    /// The callback is dropped before the lock is released, so teardown
    /// never reports an unlock.
    pub fn release(&mut self) {
        self.callback.clear();
        self.release_lock();
        if let Some(manager) = self.manager.take() {
            manager.dispose();
        }
    }
}

impl<M: LockManager> Default for LockState<M> {
    fn default() -> Self {
        Self::new()
    }
}
