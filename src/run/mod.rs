//! Command runners for the `lockbridge` binary.

pub mod idle;
pub mod lock;
pub mod probe;
mod pump;

use lockbridge::AdapterError;
use tokio::signal::unix::{Signal, SignalKind, signal as tokio_signal};

/// Errors from the command runners.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The compositor ended the lock before confirming it.
    #[error("compositor refused the session lock")]
    LockDenied,

    #[error("session lock not confirmed within {0}s")]
    ConfirmTimeout(u64),

    #[error("adapter thread exited unexpectedly")]
    AdapterExited,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// SIGTERM and SIGINT, merged.
pub struct Signals {
    term: Signal,
    int: Signal,
}

impl Signals {
    pub fn install() -> Result<Self, RunError> {
        Ok(Self {
            term: tokio_signal(SignalKind::terminate())?,
            int: tokio_signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the next signal; returns its name.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.term.recv() => "SIGTERM",
            _ = self.int.recv() => "SIGINT",
        }
    }
}
