//! Adapter errors shared by the idle-notify and session-lock adapters.

/// Errors returned by the protocol adapters.
///
/// Only `init()` and the dispatch helpers return these. Runtime requests
/// (`lock`, `unlock`, `set_timeout`) degrade to no-ops instead.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The Wayland connection could not be opened (e.g. not running
    /// inside a Wayland session).
    #[error("no Wayland transport: {0}")]
    NoTransport(String),

    /// The compositor does not advertise a required global, or it did
    /// not bind within the handshake round-trip.
    #[error("compositor does not provide {0}")]
    CapabilityMissing(&'static str),

    #[error("adapter is already initialized")]
    AlreadyInitialized,

    #[error("adapter is not initialized")]
    NotInitialized,

    /// Protocol error or lost connection while dispatching events.
    #[error("dispatch: {0}")]
    Dispatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Whether this error describes the environment rather than a bug:
    /// no compositor, or a compositor lacking the protocol.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::NoTransport(_) | Self::CapabilityMissing(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_errors_are_unsupported() {
        assert!(AdapterError::NoTransport("no socket".into()).is_unsupported());
        assert!(AdapterError::CapabilityMissing("wl_seat").is_unsupported());
        assert!(!AdapterError::AlreadyInitialized.is_unsupported());
        assert!(!AdapterError::Dispatch("broken pipe".into()).is_unsupported());
    }

    #[test]
    fn capability_message_names_interface() {
        let e = AdapterError::CapabilityMissing("ext_session_lock_manager_v1");
        assert_eq!(
            e.to_string(),
            "compositor does not provide ext_session_lock_manager_v1"
        );
    }
}
