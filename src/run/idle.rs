//! `lockbridge idle`: report idleness and optionally run a command.

use std::process::Stdio;
use std::time::Duration;

use lockbridge::{AdapterError, IdleNotify};

use super::pump::{self, Pumped};
use super::{RunError, Signals};

pub enum IdleCommand {
    Arm(u32),
}

/// Emitted by the adapter callback on every `idled` event.
pub struct Idled;

impl Pumped for IdleNotify {
    type Command = IdleCommand;

    fn apply(&mut self, command: IdleCommand) {
        match command {
            IdleCommand::Arm(seconds) => self.set_timeout(seconds),
        }
    }

    fn dispatch_timeout(&mut self, timeout: Duration) -> Result<usize, AdapterError> {
        IdleNotify::dispatch_timeout(self, timeout)
    }

    fn fini(&mut self) {
        IdleNotify::fini(self);
    }
}

/// Run the idle command.
///
/// Every time the session goes idle for `timeout` seconds, `command` (if
/// any) is spawned. With `once`, returns after the first idle period.
pub async fn run(timeout: u32, once: bool, command: Vec<String>) -> Result<(), RunError> {
    let mut signals = Signals::install()?;

    let (thread, mut events) = pump::spawn::<IdleNotify, Idled, _>("wayland-idle", |tx| {
        let mut idle = IdleNotify::new();
        idle.init()?;
        idle.set_callback(move || {
            let _ = tx.send(Idled);
        });
        Ok(idle)
    })
    .await?;

    thread.send(IdleCommand::Arm(timeout))?;
    tracing::info!(timeout, "waiting for idle");

    let result = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(Idled) = event else {
                    break Err(RunError::AdapterExited);
                };
                eprintln!("idle for {timeout}s");
                if spawn_command(&command) {
                    tracing::debug!("idle command started");
                }
                if once {
                    break Ok(());
                }
            }
            sig = signals.recv() => {
                tracing::info!(signal = sig, "stopping idle watch");
                break Ok(());
            }
        }
    };

    thread.shutdown();
    result
}

/// Spawn `command` without waiting for it; its exit status is logged
/// from a background task. Returns whether a child was started.
fn spawn_command(command: &[String]) -> bool {
    let Some((program, args)) = command.split_first() else {
        return false;
    };

    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(program = %program, error = %e, "failed to spawn idle command");
            eprintln!("lockbridge idle: cannot run {program}: {e}");
            return false;
        }
    };

    let program = program.clone();
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {
                tracing::debug!(program = %program, "idle command finished");
            }
            Ok(status) => {
                tracing::warn!(program = %program, %status, "idle command failed");
            }
            Err(e) => {
                tracing::warn!(program = %program, error = %e, "failed to wait for idle command");
            }
        }
    });
    true
}
