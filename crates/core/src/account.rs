// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account configuration records.

use serde::{Deserialize, Serialize};

/// A named identity with its own credentials and working directory.
///
/// Invariant: `name` is unique and case-insensitive across the daemon's
/// configured accounts; a secret token exists on disk at
/// `<base>/tokens/<name>.token` with permission bits 0600.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub config_dir: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Declared skills this account's agent can be matched against by
    /// `suggest_assignee` (§4.H). Not part of the distilled spec's Account
    /// shape, but needed so skill-match scoring has something to read.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

impl Account {
    /// The canonical lowercase key used for case-insensitive uniqueness checks.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Checks that a set of accounts has unique, case-insensitive names.
///
/// Returns the first duplicate name found, if any.
pub fn find_duplicate_name(accounts: &[Account]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    for account in accounts {
        let key = account.key();
        if !seen.insert(key) {
            return Some(account.name.clone());
        }
    }
    None
}
