//! Wayland backing for the session-lock state machine.

use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};
use wayland_protocols::ext::session_lock::v1::client::ext_session_lock_manager_v1::ExtSessionLockManagerV1;
use wayland_protocols::ext::session_lock::v1::client::ext_session_lock_v1::{
    self, ExtSessionLockV1,
};

use super::state::{LockHandle, LockManager, LockState};
use crate::registry::{self, Capability};

pub type WaylandLockState = LockState<WaylandLockManager>;

pub struct WaylandLockManager {
    proxy: ExtSessionLockManagerV1,
    qh: QueueHandle<WaylandLockState>,
}

impl LockManager for WaylandLockManager {
    type Lock = ExtSessionLockV1;

    fn request_lock(&self) -> ExtSessionLockV1 {
        self.proxy.lock(&self.qh, ())
    }

    fn dispose(self) {
        self.proxy.destroy();
    }
}

impl LockHandle for ExtSessionLockV1 {
    fn unlock(self) {
        self.unlock_and_destroy();
    }

    fn dispose(self) {
        self.destroy();
    }
}

impl Dispatch<WlRegistry, ()> for WaylandLockState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => {
                let wanted = [Capability::of::<ExtSessionLockManagerV1>(Some(1))];
                let Some(cap) = registry::find(&wanted, &interface) else {
                    return;
                };
                if state.has_manager() {
                    registry::log_duplicate(cap, name);
                    return;
                }

                let proxy = registry.bind::<ExtSessionLockManagerV1, _, _>(
                    name,
                    cap.bind_version(version),
                    qh,
                    (),
                );
                tracing::debug!(name, "bound ext_session_lock_manager_v1");
                state.bind_manager(WaylandLockManager {
                    proxy,
                    qh: qh.clone(),
                });
            }
            wl_registry::Event::GlobalRemove { name } => registry::log_removal(name),
            _ => {}
        }
    }
}

impl Dispatch<ExtSessionLockManagerV1, ()> for WaylandLockState {
    fn event(
        _state: &mut Self,
        _proxy: &ExtSessionLockManagerV1,
        _event: <ExtSessionLockManagerV1 as Proxy>::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // No events.
    }
}

impl Dispatch<ExtSessionLockV1, ()> for WaylandLockState {
    fn event(
        state: &mut Self,
        proxy: &ExtSessionLockV1,
        event: ext_session_lock_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            ext_session_lock_v1::Event::Locked => state.on_locked(proxy),
            ext_session_lock_v1::Event::Finished => state.on_finished(proxy),
            _ => {}
        }
    }
}
