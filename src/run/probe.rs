//! `lockbridge probe`: report which protocols the compositor supports.

use lockbridge::{AdapterError, IdleNotify, SessionLock};

/// Initialize each adapter once and print the outcome.
///
/// Returns whether both protocols are available.
pub fn run() -> bool {
    let mut idle = IdleNotify::new();
    let idle_ok = report("ext-idle-notify-v1", idle.init());
    idle.fini();

    let mut lock = SessionLock::new();
    let lock_ok = report("ext-session-lock-v1", lock.init());
    lock.fini();

    idle_ok && lock_ok
}

fn report(protocol: &str, result: Result<(), AdapterError>) -> bool {
    println!("{}", describe(protocol, &result));
    result.is_ok()
}

fn describe(protocol: &str, result: &Result<(), AdapterError>) -> String {
    match result {
        Ok(()) => format!("{protocol}: supported"),
        Err(e) if e.is_unsupported() => format!("{protocol}: unsupported ({e})"),
        Err(e) => format!("{protocol}: error ({e})"),
    }
}
