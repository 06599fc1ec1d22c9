//! Wayland backing for the idle state machine.
//!
//! Binds `ext_idle_notifier_v1` and `wl_seat` from the registry and
//! routes `ext_idle_notification_v1` events into [`IdleState`].

use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::protocol::wl_seat::{self, WlSeat};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};
use wayland_protocols::ext::idle_notify::v1::client::ext_idle_notification_v1::{
    self, ExtIdleNotificationV1,
};
use wayland_protocols::ext::idle_notify::v1::client::ext_idle_notifier_v1::ExtIdleNotifierV1;

use super::state::{IdleNotification, IdleNotifier, IdleState, SeatHandle};
use crate::registry::{self, Capability};

/// `wl_seat.release` only exists from version 5 on.
const SEAT_RELEASE_SINCE: u32 = 5;

pub type WaylandIdleState = IdleState<WaylandNotifier>;

/// Bound notifier plus the queue its notifications are created on.
pub struct WaylandNotifier {
    proxy: ExtIdleNotifierV1,
    qh: QueueHandle<WaylandIdleState>,
}

pub struct WaylandSeat(WlSeat);

impl IdleNotifier for WaylandNotifier {
    type Seat = WaylandSeat;
    type Notification = ExtIdleNotificationV1;

    fn notify_after(&self, timeout_ms: u32, seat: &WaylandSeat) -> ExtIdleNotificationV1 {
        self.proxy
            .get_idle_notification(timeout_ms, &seat.0, &self.qh, ())
    }

    fn dispose(self) {
        self.proxy.destroy();
    }
}

impl IdleNotification for ExtIdleNotificationV1 {
    fn dispose(self) {
        self.destroy();
    }
}

impl SeatHandle for WaylandSeat {
    fn dispose(self) {
        if self.0.version() >= SEAT_RELEASE_SINCE {
            self.0.release();
        }
    }
}

fn wanted() -> [Capability; 2] {
    [
        Capability::of::<ExtIdleNotifierV1>(Some(1)),
        Capability::of::<WlSeat>(None),
    ]
}

impl Dispatch<WlRegistry, ()> for WaylandIdleState {
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
                let wanted = wanted();
                let Some(cap) = registry::find(&wanted, &interface) else {
                    return;
                };

                if cap.interface == ExtIdleNotifierV1::interface().name {
                    if state.has_notifier() {
                        registry::log_duplicate(cap, name);
                        return;
                    }
                    let proxy = registry.bind::<ExtIdleNotifierV1, _, _>(
                        name,
                        cap.bind_version(version),
                        qh,
                        (),
                    );
                    tracing::debug!(name, "bound ext_idle_notifier_v1");
                    state.bind_notifier(WaylandNotifier {
                        proxy,
                        qh: qh.clone(),
                    });
                } else {
                    if state.has_seat() {
                        registry::log_duplicate(cap, name);
                        return;
                    }
                    let version = cap.bind_version(version);
                    let seat = registry.bind::<WlSeat, _, _>(name, version, qh, ());
                    tracing::debug!(name, version, "bound wl_seat");
                    state.bind_seat(WaylandSeat(seat));
                }
            }
            wl_registry::Event::GlobalRemove { name } => registry::log_removal(name),
            _ => {}
        }
    }
}

impl Dispatch<ExtIdleNotifierV1, ()> for WaylandIdleState {
    fn event(
        _state: &mut Self,
        _proxy: &ExtIdleNotifierV1,
        _event: <ExtIdleNotifierV1 as Proxy>::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // No events.
    }
}

impl Dispatch<WlSeat, ()> for WaylandIdleState {
    fn event(
        _state: &mut Self,
        _proxy: &WlSeat,
        event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Name { name } = event {
            tracing::debug!(seat = %name, "seat name");
        }
    }
}

impl Dispatch<ExtIdleNotificationV1, ()> for WaylandIdleState {
    fn event(
        state: &mut Self,
        proxy: &ExtIdleNotificationV1,
        event: ext_idle_notification_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            ext_idle_notification_v1::Event::Idled => state.on_idled(proxy),
            ext_idle_notification_v1::Event::Resumed => state.on_resumed(proxy),
            _ => {}
        }
    }
}
