// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token authentication primitives (§3, §4.A, §5).
//!
//! Tokens are compared in constant time to avoid leaking match length via
//! timing, and the token file backing an account must not be group- or
//! world-readable.

use hubd_core::HubError;
use std::fs;
use std::path::Path;

/// Constant-time byte comparison. Returns `false` immediately on length
/// mismatch since the length of a secret token is not itself a secret.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    if expected.len() != provided.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (a, b) in expected.iter().zip(provided.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}

/// Loads a token file, rejecting it outright if its permissions allow any
/// access beyond the owner (mode must be `0600` or stricter).
#[cfg(unix)]
pub fn read_token_file(path: &Path) -> Result<String, HubError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)?;
    let mode = metadata.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(HubError::unauthorized(format!(
            "token file {} is readable or writable by group/other (mode {:o}); expected 0600",
            path.display(),
            mode
        )));
    }

    let contents = fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

#[cfg(not(unix))]
pub fn read_token_file(path: &Path) -> Result<String, HubError> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_tokens_match() {
        assert!(tokens_match("secret-token", "secret-token"));
    }

    #[test]
    fn different_length_tokens_never_match() {
        assert!(!tokens_match("short", "much-longer-token"));
    }

    #[test]
    fn same_length_different_tokens_do_not_match() {
        assert!(!tokens_match("aaaaaaaa", "aaaaaaab"));
    }

    #[cfg(unix)]
    #[test]
    fn token_file_with_loose_permissions_is_rejected() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "shh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let err = read_token_file(&path).unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[cfg(unix)]
    #[test]
    fn token_file_with_owner_only_permissions_is_accepted() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "shh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        assert_eq!(read_token_file(&path).unwrap(), "shh");
    }
}
