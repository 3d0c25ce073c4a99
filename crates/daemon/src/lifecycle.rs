// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup/shutdown discipline (§4.K, §6).
//!
//! Startup order: acquire the PID lock first, then create directories,
//! then open the stores, then remove a stale socket, then bind, then
//! install signal handlers, then serve. A failed lock attempt never
//! touches any file — it means another daemon instance is already
//! running. Any other startup failure cleans up the files this run
//! created (the socket; the PID lock releases itself on drop).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a base directory ($AGENTCTL_DIR or $HOME unset)")]
    NoStateDir,
    #[error("failed to acquire the daemon lock at {0}: {1}")]
    LockFailed(PathBuf, #[source] io::Error),
    #[error("failed to bind the socket at {0}: {1}")]
    BindFailed(PathBuf, io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Runtime(String),
}

impl LifecycleError {
    /// Exit code mapping for `main` (§6): `0` only on a clean shutdown,
    /// `1` for every startup or runtime failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Holds the exclusively-locked PID file for the daemon's lifetime.
///
/// The lock is acquired *before* the PID is written, so a failed
/// acquisition against an already-running daemon never wipes that
/// daemon's PID file out from under it.
pub struct PidLock {
    file: File,
    path: PathBuf,
}

impl PidLock {
    pub fn acquire(path: &Path) -> Result<Self, LifecycleError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;

        file.try_lock_exclusive().map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;

        let mut file = file;
        file.set_len(0).map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;
        write!(file, "{}", std::process::id()).map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;
        file.sync_all().map_err(|e| LifecycleError::LockFailed(path.to_path_buf(), e))?;

        Ok(Self { file, path: path.to_path_buf() })
    }

    /// Releases the lock and removes the PID file. Called only on a clean
    /// shutdown — a crash leaves the file behind for the next startup's
    /// lock attempt to resolve (stale lock vs. still-running daemon).
    pub fn release(self) {
        let _ = FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

/// Removes a stale socket file left by an unclean previous shutdown.
/// Absence is not an error.
pub fn remove_stale_socket(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Creates every directory this daemon writes beneath `base`.
pub fn ensure_base_dirs(base: &Path) -> io::Result<()> {
    fs::create_dir_all(base)?;
    fs::create_dir_all(crate::env::tokens_dir(base))?;
    fs::create_dir_all(crate::env::journal_dir(base))?;
    Ok(())
}

/// Removes files this run created, on a startup failure that occurred
/// after the PID lock was already held. Never called when the failure
/// *is* `LockFailed` — those files belong to whichever daemon holds the
/// lock, running or not.
pub fn cleanup_on_failure(base: &Path) {
    let _ = remove_stale_socket(&crate::env::socket_path(base));
}
