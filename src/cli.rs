use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lockbridge",
    about = "Session lock and idle notification helper for Wayland compositors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lock the session and hold the lock until interrupted
    Lock {
        /// Seconds to wait for the compositor to confirm the lock
        #[arg(long, default_value_t = 5)]
        confirm_timeout: u64,
    },

    /// Report when the session has been idle for a while
    Idle {
        /// Idle timeout in seconds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        timeout: u32,

        /// Exit after the first idle period
        #[arg(long)]
        once: bool,

        /// Command to run each time the session goes idle
        #[arg(trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Check which protocols the compositor supports
    Probe,
}
