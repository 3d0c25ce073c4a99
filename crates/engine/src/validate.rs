// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural validation of a [`HandoffPayload`] against the invariants of
//! §3, run after input sanitization. Errors are collected and returned
//! together rather than failing fast on the first one, so a caller sees
//! every problem with a submission in one round trip.

use hubd_core::{HandoffPayload, HubError};

pub fn validate(payload: &HandoffPayload) -> Result<(), HubError> {
    let mut errors = Vec::new();

    if payload.goal.trim().is_empty() {
        errors.push("goal must be non-empty".to_string());
    }
    if payload.acceptance_criteria.is_empty() {
        errors.push("acceptance_criteria must be non-empty".to_string());
    }
    if payload.run_commands.is_empty() {
        errors.push("run_commands must be non-empty".to_string());
    }
    if payload.blocked_by.is_empty() {
        errors.push("blocked_by must be non-empty (use \"none\" when there are no blockers)".to_string());
    }
    if let Some(minutes) = payload.estimated_duration_minutes {
        if minutes < 0.0 {
            errors.push("estimated_duration_minutes must be non-negative".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(HubError::validation(errors.join("; ")))
    }
}
