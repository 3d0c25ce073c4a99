// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical base-directory resolution (§6, §9): every path the daemon
//! touches on disk is derived from a single root, `$AGENTCTL_DIR` if set,
//! else `$HOME/.agentctl`.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolves the base directory: `$AGENTCTL_DIR` if set, else `$HOME/.agentctl`.
pub fn base_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("AGENTCTL_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".agentctl"))
}

/// `<base>/hub.sock`
pub fn socket_path(base: &std::path::Path) -> PathBuf {
    base.join("hub.sock")
}

/// `<base>/daemon.pid`
pub fn lock_path(base: &std::path::Path) -> PathBuf {
    base.join("daemon.pid")
}

/// `<base>/config.json`
pub fn config_path(base: &std::path::Path) -> PathBuf {
    base.join("config.json")
}

/// `<base>/hub.sqlite3`
pub fn db_path(base: &std::path::Path) -> PathBuf {
    base.join("hub.sqlite3")
}

/// `<base>/tasks`, the handoff journal root.
pub fn journal_dir(base: &std::path::Path) -> PathBuf {
    base.join("tasks")
}

/// `<base>/tokens`, one file per account.
pub fn tokens_dir(base: &std::path::Path) -> PathBuf {
    base.join("tokens")
}

/// `<base>/tokens/<account>.token`
pub fn token_path(base: &std::path::Path, account: &str) -> PathBuf {
    tokens_dir(base).join(format!("{account}.token"))
}

/// `<base>/hmac.secret`, the per-daemon signing key for verification receipts.
pub fn hmac_secret_path(base: &std::path::Path) -> PathBuf {
    base.join("hmac.secret")
}

/// `<base>/daemon.log`
pub fn log_path(base: &std::path::Path) -> PathBuf {
    base.join("daemon.log")
}
