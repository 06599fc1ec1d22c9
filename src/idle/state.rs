//! Idle-notify state machine, independent of the Wayland objects behind it.
//!
//! Owns the bound notifier and seat, at most one live notification, and
//! the user callback. Every protocol request goes through the traits
//! below so the transitions can be exercised without a compositor.

use crate::callback::CallbackSlot;
use crate::error::AdapterError;

/// The bound `ext_idle_notifier_v1` global.
pub trait IdleNotifier {
    type Seat: SeatHandle;
    type Notification: IdleNotification;

    /// Create a notification that fires after `timeout_ms` of inactivity
    /// on `seat`. The returned object already has its listener installed.
    fn notify_after(&self, timeout_ms: u32, seat: &Self::Seat) -> Self::Notification;

    /// Destroy the notifier. Existing notifications are not affected.
    fn dispose(self);
}

/// A live `ext_idle_notification_v1`.
pub trait IdleNotification: PartialEq {
    fn dispose(self);
}

/// The bound `wl_seat`.
pub trait SeatHandle {
    fn dispose(self);
}

/// Convert a timeout in seconds to the protocol's milliseconds,
/// saturating at `u32::MAX` instead of wrapping.
pub fn timeout_ms(seconds: u32) -> u32 {
    seconds.saturating_mul(1000)
}

/// Module state for one idle-notify adapter.
pub struct IdleState<N: IdleNotifier> {
    notifier: Option<N>,
    seat: Option<N::Seat>,
    notification: Option<N::Notification>,
    callback: CallbackSlot<()>,
}

impl<N: IdleNotifier> IdleState<N> {
    pub fn new() -> Self {
        Self {
            notifier: None,
            seat: None,
            notification: None,
            callback: CallbackSlot::new(),
        }
    }

    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn has_seat(&self) -> bool {
        self.seat.is_some()
    }

    /// Store a freshly bound notifier. Only the first one is kept.
    pub fn bind_notifier(&mut self, notifier: N) {
        if self.notifier.is_none() {
            self.notifier = Some(notifier);
        }
    }

    /// Store a freshly bound seat. Only the first one is kept.
    pub fn bind_seat(&mut self, seat: N::Seat) {
        if self.seat.is_none() {
            self.seat = Some(seat);
        }
    }

    /// Check that the handshake bound everything. Partial binding is a
    /// failure.
    pub fn check_resolved(&self) -> Result<(), AdapterError> {
        if self.notifier.is_none() {
            return Err(AdapterError::CapabilityMissing("ext_idle_notifier_v1"));
        }
        if self.seat.is_none() {
            return Err(AdapterError::CapabilityMissing("wl_seat"));
        }
        Ok(())
    }

    pub fn set_callback(&mut self, mut f: impl FnMut() + 'static) {
        self.callback.set(move |()| f());
    }

    pub fn clear_callback(&mut self) {
        self.callback.clear();
    }

    /// Whether a notification is currently armed.
    pub fn is_armed(&self) -> bool {
        self.notification.is_some()
    }

    /// (Re)arm the idle notification.
    ///
    /// Any existing notification is destroyed first, so the countdown
    /// always restarts. `0` disables notifications.
    pub fn set_timeout(&mut self, seconds: u32) {
        if let Some(old) = self.notification.take() {
            old.dispose();
            tracing::debug!("destroyed previous idle notification");
        }

        if seconds == 0 {
            tracing::info!("idle notifications disabled");
            return;
        }

        let (Some(notifier), Some(seat)) = (self.notifier.as_ref(), self.seat.as_ref()) else {
            tracing::debug!(seconds, "idle notifier not bound, ignoring timeout");
            return;
        };

        let timeout_ms = timeout_ms(seconds);
        self.notification = Some(notifier.notify_after(timeout_ms, seat));
        tracing::info!(timeout_ms, "armed idle notification");
    }

    /// `idled` event: the inactivity threshold was reached.
    pub fn on_idled(&mut self, source: &N::Notification) {
        if self.notification.as_ref() != Some(source) {
            tracing::debug!("idled event from a stale notification");
            return;
        }
        tracing::info!("session idle");
        self.callback.fire(());
    }

    /// `resumed` event. Not forwarded; callers re-arm with `set_timeout`.
    pub fn on_resumed(&mut self, _source: &N::Notification) {
        tracing::debug!("session resumed from idle");
    }

    /// Release everything: callback, notification, notifier, seat.
    ///
    /// Safe to call repeatedly and on a state that never bound anything.
    pub fn release(&mut self) {
        self.callback.clear();

        if let Some(notification) = self.notification.take() {
            notification.dispose();
        }
        if let Some(notifier) = self.notifier.take() {
            notifier.dispose();
        }
        if let Some(seat) = self.seat.take() {
            seat.dispose();
        }
    }
}

impl<N: IdleNotifier> Default for IdleState<N> {
    fn default() -> Self {
        Self::new()
    }
}
