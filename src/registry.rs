//! Capability matching for the registry handshake.
//!
//! The compositor announces every global as `(name, interface, version)`.
//! Each adapter describes the globals it needs as [`Capability`] values;
//! its `Dispatch<WlRegistry, ()>` impl asks [`find`] whether an
//! announcement is wanted and binds it at [`Capability::bind_version`].

use wayland_client::Proxy;

/// A global interface an adapter binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Interface name as announced by the compositor.
    pub interface: &'static str,
    /// Highest version this client will bind.
    pub max_version: u32,
}

impl Capability {
    /// Capability for proxy type `I`.
    ///
    /// `pinned` caps the bind version below what the client library
    /// knows; `None` binds up to the library's version.
    pub fn of<I: Proxy>(pinned: Option<u32>) -> Self {
        let iface = I::interface();
        Self {
            interface: iface.name,
            max_version: pinned.map_or(iface.version, |v| v.min(iface.version)),
        }
    }

    pub fn matches(&self, interface: &str) -> bool {
        self.interface == interface
    }

    /// Version to bind a global announced at `announced`.
    pub fn bind_version(&self, announced: u32) -> u32 {
        announced.min(self.max_version)
    }
}

/// Look up the wanted capability matching an announced interface.
pub fn find<'a>(wanted: &'a [Capability], interface: &str) -> Option<&'a Capability> {
    wanted.iter().find(|c| c.matches(interface))
}

/// Log an announcement for a capability that is already bound.
///
/// The first announcement wins; later ones are left unbound.
pub fn log_duplicate(capability: &Capability, name: u32) {
    tracing::debug!(
        interface = capability.interface,
        name,
        "ignoring duplicate global, already bound"
    );
}

/// Log a `global_remove`. Nothing this crate binds is expected to go
/// away mid-session, so removals are not acted on.
pub fn log_removal(name: u32) {
    tracing::debug!(name, "global removed");
}
