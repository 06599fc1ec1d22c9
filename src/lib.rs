//! Client-side adapters for two Wayland session protocols.
//!
//! - [`idle::IdleNotify`]: `ext-idle-notify-v1`: a callback after a
//!   period of user inactivity.
//! - [`lock::SessionLock`]: `ext-session-lock-v1`: request and release
//!   the locked state without drawing a lock screen.
//!
//! Both share one shape: `init()` connects and binds the globals through
//! a registry round-trip, a single callback slot reports events, and
//! `fini()` (also run on drop) releases everything in reverse dependency
//! order. Events are only delivered while the caller dispatches the
//! connection.

pub mod callback;
pub mod error;
pub mod idle;
pub mod lock;
pub mod registry;
pub mod transport;

pub use error::AdapterError;
pub use idle::IdleNotify;
pub use lock::SessionLock;
