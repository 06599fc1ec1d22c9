// In-process compositor for driving the adapters over a real Wayland
// connection. Not a test in itself; shared by the files in tests/.

#![allow(dead_code)]

use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use wayland_client::Connection;
use wayland_protocols::ext::idle_notify::v1::server::ext_idle_notification_v1::{
    self, ExtIdleNotificationV1,
};
use wayland_protocols::ext::idle_notify::v1::server::ext_idle_notifier_v1::{
    self, ExtIdleNotifierV1,
};
use wayland_protocols::ext::session_lock::v1::server::ext_session_lock_manager_v1::{
    self, ExtSessionLockManagerV1,
};
use wayland_protocols::ext::session_lock::v1::server::ext_session_lock_v1::{
    self, ExtSessionLockV1,
};
use wayland_server::backend::{ClientData, ClientId, DisconnectReason, GlobalId};
use wayland_server::protocol::wl_seat::{self, WlSeat};
use wayland_server::{
    Client, DataInit, Dispatch, Display, DisplayHandle, GlobalDispatch, New, Resource,
};

/// How the compositor answers `ext_session_lock_manager_v1.lock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReply {
    Locked,
    Finished,
}

/// Globals to announce, in this order: lock managers, idle notifiers,
/// then the seat.
#[derive(Debug, Clone)]
pub struct Setup {
    pub lock_managers: u32,
    pub idle_notifiers: u32,
    pub seat_version: Option<u32>,
    pub lock_reply: LockReply,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            lock_managers: 1,
            idle_notifiers: 1,
            seat_version: Some(7),
            lock_reply: LockReply::Locked,
        }
    }
}

/// Server-side state. `requests` records every request the clients sent,
/// in arrival order.
#[derive(Debug)]
pub struct Compositor {
    pub requests: Vec<String>,
    lock_reply: LockReply,
}

enum Command {
    AddClient(UnixStream),
    RemoveGlobals,
}

/// Compositor running on its own thread until [`finish`](Self::finish).
pub struct TestCompositor {
    commands: mpsc::Sender<Command>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Compositor>,
}

impl TestCompositor {
    pub fn spawn(setup: Setup) -> Self {
        let (commands, command_rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = std::thread::spawn(move || serve(setup, command_rx, thread_stop));

        Self {
            commands,
            stop,
            handle,
        }
    }

    /// Open a new client connection to the compositor.
    pub fn connect(&self) -> Connection {
        let (server, client) = UnixStream::pair().unwrap();
        self.commands.send(Command::AddClient(server)).unwrap();
        Connection::from_socket(client).unwrap()
    }

    /// Withdraw every global. Objects already bound stay valid.
    pub fn remove_globals(&self) {
        self.commands.send(Command::RemoveGlobals).unwrap();
    }

    /// Stop the compositor after it has handled everything already sent,
    /// and return its state.
    pub fn finish(self) -> Compositor {
        self.stop.store(true, Ordering::Release);
        self.handle.join().unwrap()
    }
}

fn serve(setup: Setup, commands: mpsc::Receiver<Command>, stop: Arc<AtomicBool>) -> Compositor {
    let mut display = Display::<Compositor>::new().unwrap();
    let mut dh = display.handle();

    let mut globals: Vec<GlobalId> = Vec::new();
    for index in 0..setup.lock_managers {
        globals.push(dh.create_global::<Compositor, ExtSessionLockManagerV1, u32>(1, index));
    }
    for index in 0..setup.idle_notifiers {
        globals.push(dh.create_global::<Compositor, ExtIdleNotifierV1, u32>(1, index));
    }
    if let Some(version) = setup.seat_version {
        globals.push(dh.create_global::<Compositor, WlSeat, ()>(version, ()));
    }

    let mut state = Compositor {
        requests: Vec::new(),
        lock_reply: setup.lock_reply,
    };

    loop {
        // Read the flag first so the final pass sees everything sent
        // before `finish()`.
        let stopping = stop.load(Ordering::Acquire);

        while let Ok(command) = commands.try_recv() {
            match command {
                Command::AddClient(stream) => {
                    dh.insert_client(stream, Arc::new(TestClientData)).unwrap();
                }
                Command::RemoveGlobals => {
                    for id in globals.drain(..) {
                        dh.remove_global::<Compositor>(id);
                    }
                }
            }
        }

        display.dispatch_clients(&mut state).unwrap();
        display.flush_clients().unwrap();

        if stopping {
            return state;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Run `step` with a 50ms dispatch budget until it returns `true`, for
/// at most about two seconds.
pub fn dispatch_until(mut step: impl FnMut(Duration) -> bool) -> bool {
    (0..40).any(|_| step(Duration::from_millis(50)))
}

/// Give in-flight events a few dispatch passes to arrive.
pub fn settle(mut step: impl FnMut(Duration)) {
    for _ in 0..4 {
        step(Duration::from_millis(50));
    }
}

struct TestClientData;

impl ClientData for TestClientData {
    fn initialized(&self, _client_id: ClientId) {}
    fn disconnected(&self, _client_id: ClientId, _reason: DisconnectReason) {}
}

impl GlobalDispatch<ExtSessionLockManagerV1, u32> for Compositor {
    fn bind(
        state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<ExtSessionLockManagerV1>,
        index: &u32,
        data_init: &mut DataInit<'_, Self>,
    ) {
        state.requests.push(format!("bind lock_manager#{index}"));
        data_init.init(resource, ());
    }
}

impl Dispatch<ExtSessionLockManagerV1, ()> for Compositor {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &ExtSessionLockManagerV1,
        request: ext_session_lock_manager_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            ext_session_lock_manager_v1::Request::Lock { id } => {
                state.requests.push("lock".into());
                let lock = data_init.init(id, ());
                match state.lock_reply {
                    LockReply::Locked => lock.locked(),
                    LockReply::Finished => lock.finished(),
                }
            }
            ext_session_lock_manager_v1::Request::Destroy => {
                state.requests.push("lock_manager destroy".into());
            }
            _ => {}
        }
    }
}

impl Dispatch<ExtSessionLockV1, ()> for Compositor {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &ExtSessionLockV1,
        request: ext_session_lock_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            ext_session_lock_v1::Request::UnlockAndDestroy => {
                state.requests.push("unlock_and_destroy".into());
            }
            ext_session_lock_v1::Request::Destroy => {
                state.requests.push("lock destroy".into());
            }
            _ => {}
        }
    }
}

impl GlobalDispatch<ExtIdleNotifierV1, u32> for Compositor {
    fn bind(
        state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<ExtIdleNotifierV1>,
        index: &u32,
        data_init: &mut DataInit<'_, Self>,
    ) {
        state.requests.push(format!("bind idle_notifier#{index}"));
        data_init.init(resource, ());
    }
}

impl Dispatch<ExtIdleNotifierV1, ()> for Compositor {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &ExtIdleNotifierV1,
        request: ext_idle_notifier_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        data_init: &mut DataInit<'_, Self>,
    ) {
        match request {
            ext_idle_notifier_v1::Request::GetIdleNotification { id, timeout, .. } => {
                state
                    .requests
                    .push(format!("get_idle_notification {timeout}"));
                // Report idle straight away so tests need not wait.
                let notification = data_init.init(id, ());
                notification.idled();
            }
            ext_idle_notifier_v1::Request::Destroy => {
                state.requests.push("idle_notifier destroy".into());
            }
            _ => {}
        }
    }
}

impl Dispatch<ExtIdleNotificationV1, ()> for Compositor {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &ExtIdleNotificationV1,
        request: ext_idle_notification_v1::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        if let ext_idle_notification_v1::Request::Destroy = request {
            state.requests.push("idle_notification destroy".into());
        }
    }
}

impl GlobalDispatch<WlSeat, ()> for Compositor {
    fn bind(
        state: &mut Self,
        _handle: &DisplayHandle,
        _client: &Client,
        resource: New<WlSeat>,
        _global_data: &(),
        data_init: &mut DataInit<'_, Self>,
    ) {
        let seat = data_init.init(resource, ());
        state.requests.push(format!("bind seat v{}", seat.version()));
    }
}

impl Dispatch<WlSeat, ()> for Compositor {
    fn request(
        state: &mut Self,
        _client: &Client,
        _resource: &WlSeat,
        request: wl_seat::Request,
        _data: &(),
        _dhandle: &DisplayHandle,
        _data_init: &mut DataInit<'_, Self>,
    ) {
        if let wl_seat::Request::Release = request {
            state.requests.push("seat release".into());
        }
    }
}
