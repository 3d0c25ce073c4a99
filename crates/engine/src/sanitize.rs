// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input sanitization, run before structural validation on every
//! `handoff_task` (§4.C).
//!
//! Two tiers: blocking rejections (length caps, shell-injection patterns,
//! unsafe context paths) and non-blocking warnings (prompt-override
//! phrasing). Both a real request and the `sanitize_only` dry-run entry
//! point go through the same function so the two can never drift.

use hubd_core::{Context, HandoffPayload, HubError};

const MAX_GOAL_CHARS: usize = 10_000;
const MAX_ACCEPTANCE_CRITERION_CHARS: usize = 2_000;
const MAX_RUN_COMMAND_CHARS: usize = 1_000;

const SHELL_INJECTION_SUBSTRINGS: &[&str] = &[
    "$(", "${", "| bash", "|bash", "| sh", "|sh", "| zsh", "|zsh", "&& rm", "; rm", "&& curl", "; curl",
    "&& wget", "; wget", "&& sudo", "; sudo", "&& chmod", "; chmod", "&& mkfs", "; mkfs", "&& dd", "; dd",
    "> /etc/", ">> /etc/", "> /dev/", ">> /dev/",
];

const PROMPT_OVERRIDE_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "ignore all previous instructions",
    "system:",
    "you are now a",
    "forget your instructions",
    "disregard previous instructions",
    "override system prompt",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SanitizationWarnings(pub Vec<String>);

/// Runs the blocking checks, returning the first violation found as a
/// `sanitization-block` error, and collects non-blocking prompt-override
/// warnings into the return value alongside a control-character-stripped
/// payload.
pub fn sanitize(payload: HandoffPayload, context: Option<&Context>) -> Result<(HandoffPayload, SanitizationWarnings), HubError> {
    if payload.goal.chars().count() > MAX_GOAL_CHARS {
        return Err(HubError::sanitization_block(format!("goal exceeds {MAX_GOAL_CHARS} characters")));
    }
    for item in &payload.acceptance_criteria {
        if item.chars().count() > MAX_ACCEPTANCE_CRITERION_CHARS {
            return Err(HubError::sanitization_block(format!(
                "acceptance_criteria item exceeds {MAX_ACCEPTANCE_CRITERION_CHARS} characters"
            )));
        }
    }
    for item in &payload.run_commands {
        if item.chars().count() > MAX_RUN_COMMAND_CHARS {
            return Err(HubError::sanitization_block(format!(
                "run_commands item exceeds {MAX_RUN_COMMAND_CHARS} characters"
            )));
        }
        if contains_backtick_substitution(item) || contains_shell_injection(item) {
            return Err(HubError::sanitization_block(format!("run_commands item blocked by shell-injection pattern: {item}")));
        }
    }
    if let Some(context) = context {
        for (key, value) in context {
            if contains_unsafe_path_chars(value) || contains_unsafe_path_chars(key) {
                return Err(HubError::sanitization_block(format!("context entry '{key}' contains an unsafe path")));
            }
        }
    }

    let mut warnings = Vec::new();
    for pattern in PROMPT_OVERRIDE_PATTERNS {
        if contains_ci(&payload.goal, pattern) {
            warnings.push(format!("goal contains prompt-override phrasing: \"{pattern}\""));
        }
        for item in &payload.acceptance_criteria {
            if contains_ci(item, pattern) {
                warnings.push(format!("acceptance_criteria contains prompt-override phrasing: \"{pattern}\""));
            }
        }
    }

    let stripped = strip_payload(payload);
    Ok((stripped, SanitizationWarnings(warnings)))
}

fn contains_backtick_substitution(s: &str) -> bool {
    s.contains('`')
}

fn contains_shell_injection(s: &str) -> bool {
    SHELL_INJECTION_SUBSTRINGS.iter().any(|pat| s.contains(pat)) || contains_home_dotfile_redirect(s)
}

fn contains_home_dotfile_redirect(s: &str) -> bool {
    (s.contains('>') ) && s.contains("/.") && (s.contains("~/.") || s.contains("$HOME/."))
}

fn contains_unsafe_path_chars(s: &str) -> bool {
    s.contains("..") || s.contains('\0') || s.chars().any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Strips control characters from every string field, preserving
/// `\n`, `\r`, and `\t`.
fn strip_payload(mut payload: HandoffPayload) -> HandoffPayload {
    payload.goal = strip_controls(&payload.goal);
    payload.acceptance_criteria = payload.acceptance_criteria.iter().map(|s| strip_controls(s)).collect();
    payload.run_commands = payload.run_commands.iter().map(|s| strip_controls(s)).collect();
    payload.blocked_by = payload.blocked_by.iter().map(|s| strip_controls(s)).collect();
    payload
}

fn strip_controls(s: &str) -> String {
    s.chars().filter(|c| !c.is_control() || *c == '\n' || *c == '\r' || *c == '\t').collect()
}
