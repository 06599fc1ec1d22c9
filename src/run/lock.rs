//! `lockbridge lock`: take the session lock and hold it.
//!
//! Requests the lock, waits for the compositor to confirm it, then holds
//! it until a signal arrives or the compositor finishes the lock itself.

use std::time::Duration;

use lockbridge::{AdapterError, SessionLock};

use super::pump::{self, Pumped};
use super::{RunError, Signals};

pub enum LockCommand {
    Lock,
    Unlock,
}

impl Pumped for SessionLock {
    type Command = LockCommand;

    fn apply(&mut self, command: LockCommand) {
        match command {
            LockCommand::Lock => self.lock(),
            LockCommand::Unlock => self.unlock(),
        }
    }

    fn dispatch_timeout(&mut self, timeout: Duration) -> Result<usize, AdapterError> {
        SessionLock::dispatch_timeout(self, timeout)
    }

    fn fini(&mut self) {
        SessionLock::fini(self);
    }
}

/// Run the lock command.
pub async fn run(confirm_timeout: u64) -> Result<(), RunError> {
    let mut signals = Signals::install()?;

    let (thread, mut events) = pump::spawn::<SessionLock, bool, _>("wayland-lock", |tx| {
        let mut lock = SessionLock::new();
        lock.init()?;
        lock.set_callback(move |locked: bool| {
            let _ = tx.send(locked);
        });
        Ok(lock)
    })
    .await?;

    thread.send(LockCommand::Lock)?;

    // 1. Wait for confirmation.
    let wait = tokio::time::sleep(Duration::from_secs(confirm_timeout));
    tokio::pin!(wait);

    let confirmed = tokio::select! {
        event = events.recv() => match event {
            Some(true) => Ok(()),
            Some(false) => Err(RunError::LockDenied),
            None => Err(RunError::AdapterExited),
        },
        _ = &mut wait => Err(RunError::ConfirmTimeout(confirm_timeout)),
        sig = signals.recv() => {
            tracing::info!(signal = sig, "interrupted before the lock was confirmed");
            thread.shutdown();
            return Ok(());
        }
    };

    if let Err(e) = confirmed {
        thread.shutdown();
        return Err(e);
    }

    tracing::info!("session locked");
    eprintln!("session locked");

    // 2. Hold until a signal or the compositor ends the lock.
    let result = loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(true) => continue,
                Some(false) => {
                    tracing::info!("session lock finished by compositor");
                    break Ok(());
                }
                None => break Err(RunError::AdapterExited),
            },
            sig = signals.recv() => {
                tracing::info!(signal = sig, "releasing session lock");
                if let Err(e) = thread.send(LockCommand::Unlock) {
                    break Err(e);
                }
                break Ok(());
            }
        }
    };

    thread.shutdown();
    if result.is_ok() {
        eprintln!("session unlocked");
    }
    result
}
