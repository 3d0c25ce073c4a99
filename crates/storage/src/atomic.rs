// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file replacement: the durability primitive every store in this
//! crate is built on.
//!
//! A write lands in a sibling temp file, is fsynced, then renamed over the
//! destination. `rename(2)` on the same filesystem is atomic, so a reader
//! never observes a partially-written file, and a crash between the temp
//! write and the rename leaves the original file untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// A single fixed backoff between the first attempt and its retry. Not
/// exponential: this is a local single-host daemon, not a distributed
/// system, so a longer backoff schedule buys nothing.
const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_millis(10);

/// Writes `bytes` to `path` via a temp-file-then-rename sequence, retrying
/// the whole sequence exactly once after a short backoff on failure.
///
/// The temp file is created alongside `path` (same directory, so the
/// rename stays within one filesystem) with a random suffix to avoid
/// collisions between concurrent writers.
pub fn replace(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    match replace_once(path, bytes) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::thread::sleep(RETRY_BACKOFF);
            replace_once(path, bytes)
        }
    }
}

fn replace_once(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let suffix: u64 = {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        u64::from(nanos) ^ (std::process::id() as u64) << 32
    };
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("tmp");
    let tmp_path = dir.join(format!("{file_name}.tmp.{suffix:x}"));

    let mut file = File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}
