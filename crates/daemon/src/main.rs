// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hubd: the agent hub daemon.
//!
//! Background process owning the task/handoff journal, the message
//! inbox, the trust store, and the auto-launcher policy state, reachable
//! by every connected agent account over one Unix domain socket.
//!
//! Architecture:
//! - Listener task: one `tokio` task per accepted connection, each
//!   driving its own NDJSON read loop (`listener::serve`).
//! - Scheduler task: a single periodic ticker re-running the SLA
//!   stale-task scan (`scheduler::spawn`).
//! - Everything else is synchronous request handling against the shared
//!   `DaemonState`, dispatched by the router.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use hubd_daemon::config::Config;
use hubd_daemon::state::DaemonState;
use hubd_daemon::{env, lifecycle, listener, scheduler};
use hubd_core::SystemClock;
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("hubd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("hubd {}", env!("CARGO_PKG_VERSION"));
                println!("Agent hub daemon — multi-agent coordination over a local socket.");
                println!();
                println!("USAGE:");
                println!("    hubd");
                println!();
                println!("The daemon is typically started by a client CLI and should not be");
                println!("invoked directly by a human. It listens on a Unix socket under");
                println!("$AGENTCTL_DIR (default $HOME/.agentctl) for agent connections.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: hubd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let base_dir = env::base_dir()?;

    let _log_guard = setup_logging(&base_dir)?;
    info!(base_dir = %base_dir.display(), "starting agent hub daemon");

    if let Err(e) = run(base_dir).await {
        error!(error = %e, "daemon exiting with a fatal error");
        std::process::exit(e.exit_code());
    }

    info!("daemon stopped");
    Ok(())
}

async fn run(base_dir: std::path::PathBuf) -> Result<(), lifecycle::LifecycleError> {
    let pid_lock = lifecycle::PidLock::acquire(&env::lock_path(&base_dir))?;

    let result = start_and_serve(&base_dir).await;

    match &result {
        Ok(()) => pid_lock.release(),
        Err(_) => {
            lifecycle::cleanup_on_failure(&base_dir);
            pid_lock.release();
        }
    }
    result
}

async fn start_and_serve(base_dir: &std::path::Path) -> Result<(), lifecycle::LifecycleError> {
    lifecycle::ensure_base_dirs(base_dir)?;

    let config = Config::load(&env::config_path(base_dir)).map_err(|e| lifecycle::LifecycleError::Runtime(e.to_string()))?;
    let state = Arc::new(DaemonState::open(base_dir.to_path_buf(), config, SystemClock)?);

    lifecycle::remove_stale_socket(&env::socket_path(base_dir))?;
    let unix_listener = UnixListener::bind(env::socket_path(base_dir))
        .map_err(|e| lifecycle::LifecycleError::BindFailed(env::socket_path(base_dir), e))?;

    let shutdown = CancellationToken::new();

    let listener_handle = tokio::spawn(listener::serve(unix_listener, state.clone(), shutdown.clone()));
    let scheduler_handle = scheduler::spawn(state.clone(), shutdown.clone());

    info!(socket = %env::socket_path(base_dir).display(), "daemon ready");

    let mut sigterm = signal(SignalKind::terminate()).map_err(lifecycle::LifecycleError::Io)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(lifecycle::LifecycleError::Io)?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    shutdown.cancel();
    let _ = listener_handle.await;
    scheduler_handle.abort();

    let _ = std::fs::remove_file(env::socket_path(base_dir));
    Ok(())
}

fn setup_logging(
    base_dir: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, lifecycle::LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(base_dir).map_err(lifecycle::LifecycleError::Io)?;

    let log_path = env::log_path(base_dir);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or(lifecycle::LifecycleError::NoStateDir)?,
        log_path.file_name().ok_or(lifecycle::LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
