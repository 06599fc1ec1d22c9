mod cli;
mod run;

use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Lock { confirm_timeout } => {
            if let Err(e) = run::lock::run(confirm_timeout).await {
                tracing::error!(error = %e, "lock failed");
                eprintln!("lockbridge lock: {e}");
                std::process::exit(1);
            }
        }
        Command::Idle {
            timeout,
            once,
            command,
        } => {
            if let Err(e) = run::idle::run(timeout, once, command).await {
                tracing::error!(error = %e, "idle failed");
                eprintln!("lockbridge idle: {e}");
                std::process::exit(1);
            }
        }
        Command::Probe => {
            if !run::probe::run() {
                std::process::exit(1);
            }
        }
    }
}
