// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The NDJSON connection listener (§4.A, §5).
//!
//! Unlike a request/response-per-connection server, a hub connection is
//! long-lived and carries many requests over its lifetime: one task per
//! accepted connection reads length-unbounded lines off a [`LineFramer`]
//! until EOF, an idle timeout, or supersession by a newer connection for
//! the same account closes it.

use std::sync::Arc;
use std::time::Duration;

use hubd_core::Clock;
use hubd_wire::{encode_line, FramingError, LineFramer, Request, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::router;
use crate::state::DaemonState;

const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const READ_CHUNK: usize = 8 * 1024;

/// Per-connection state threaded through [`router::dispatch`]. `account`
/// is `None` until a successful `auth` request; `connection_id` and
/// `cancellation` back the "exactly one current connection per account"
/// invariant in [`DaemonState::supersede_connection`].
pub struct Session {
    pub account: Option<String>,
    pub(crate) connection_id: u64,
    pub(crate) cancellation: CancellationToken,
}

impl Session {
    fn new() -> Self {
        Self { account: None, connection_id: 0, cancellation: CancellationToken::new() }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts connections until `shutdown` fires, spawning one task per
/// connection.
pub async fn serve<C: Clock + Send + Sync + 'static>(
    listener: UnixListener,
    state: Arc<DaemonState<C>>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("listener stopping");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let state = state.clone();
                        let conn_shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, state, conn_shutdown).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                }
            }
        }
    }
}

async fn handle_connection<C: Clock + Send + Sync + 'static>(
    mut stream: UnixStream,
    state: Arc<DaemonState<C>>,
    shutdown: CancellationToken,
) {
    let mut session = Session::new();
    let mut framer = LineFramer::new();
    let mut buf = [0u8; READ_CHUNK];

    'outer: loop {
        let read = tokio::select! {
            _ = shutdown.cancelled() => break 'outer,
            _ = session.cancellation.cancelled() => {
                debug!(account = ?session.account, "connection superseded; closing");
                break 'outer;
            }
            _ = tokio::time::sleep(IDLE_TIMEOUT) => {
                debug!(account = ?session.account, "connection idle timeout; closing");
                break 'outer;
            }
            result = stream.read(&mut buf) => result,
        };

        let n = match read {
            Ok(0) => break 'outer,
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "connection read error");
                break 'outer;
            }
        };

        let lines = match framer.feed(&buf[..n]) {
            Ok(lines) => lines,
            Err(FramingError::LineTooLong) => {
                let _ = write_response(&mut stream, &Response::error(String::new(), "line exceeds payload cap", "validation")).await;
                break 'outer;
            }
        };

        for line in lines {
            let request: Request = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "malformed request line; continuing");
                    continue;
                }
            };

            let response = router::dispatch(&state, &mut session, request);
            if write_response(&mut stream, &response).await.is_err() {
                break 'outer;
            }
        }
    }

    if let Some(account) = session.account.take() {
        state.drop_connection_if_current(&account, session.connection_id);
    }
}

async fn write_response(stream: &mut UnixStream, response: &Response) -> std::io::Result<()> {
    let bytes = encode_line(response).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    stream.write_all(&bytes).await
}
