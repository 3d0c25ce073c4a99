// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The auto-acceptance gate and verification receipts (§4.G).
//!
//! Classification is two pure functions — cognitive friction, then (if
//! friction didn't already block) the gated action — followed by receipt
//! issuance on the terminal `accepted`/`rejected` transition. The
//! `specHash`/signature scheme deliberately never falls back to a sibling
//! handoff's payload: the hash is always computed from the exact payload
//! bound to the task being verified.

use hmac::{Hmac, Mac};
use hubd_core::{Complexity, Criticality, HandoffPayload, Reversibility, TaskId, Verdict, Verifiability, VerificationReceipt};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Blocking check result from §4.G step 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Friction {
    /// No cognitive-friction rule fired; proceed to gated-action classification.
    None,
    /// Requires a human confirmation, but auto-acceptance isn't categorically disallowed.
    Warning,
    /// Auto-acceptance is categorically disallowed; a human must review.
    Blocking,
}

/// The action the gate recommends once friction has been classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatedAction {
    AutoAccept,
    RequireAcceptance,
    RequireJustification,
    RequireElevatedReview,
}

/// §4.G step 1: the blocking cognitive-friction check.
pub fn classify_friction(criticality: Criticality, reversibility: Reversibility, complexity: Complexity) -> Friction {
    let high_or_critical = matches!(criticality, Criticality::High | Criticality::Critical);
    let not_fully_reversible = matches!(reversibility, Reversibility::Irreversible | Reversibility::Partial);
    if high_or_critical && not_fully_reversible {
        return Friction::Blocking;
    }
    if criticality == Criticality::Critical {
        return Friction::Warning;
    }
    if reversibility == Reversibility::Irreversible && matches!(complexity, Complexity::High | Complexity::Critical) {
        return Friction::Warning;
    }
    Friction::None
}

/// §4.G step 2: the gated action, given that friction did not block.
///
/// `run_commands_all_succeeded` is the workspace's verification-run
/// outcome, consulted only for the `auto-accept` candidate path.
pub fn classify_action(
    criticality: Criticality,
    reversibility: Reversibility,
    verifiability: Verifiability,
    run_commands_all_succeeded: bool,
) -> GatedAction {
    if criticality == Criticality::Critical {
        return GatedAction::RequireElevatedReview;
    }
    if criticality == Criticality::High && reversibility == Reversibility::Irreversible {
        return GatedAction::RequireJustification;
    }
    if criticality == Criticality::Low && verifiability == Verifiability::AutoTestable {
        return if run_commands_all_succeeded { GatedAction::AutoAccept } else { GatedAction::RequireAcceptance };
    }
    GatedAction::RequireAcceptance
}

/// Full classification: friction first, then the gated action if friction
/// didn't already block. Returns `None` (`Friction::Blocking`) in place of
/// a `GatedAction` when auto-acceptance is categorically disallowed.
pub fn classify(
    criticality: Criticality,
    reversibility: Reversibility,
    complexity: Complexity,
    verifiability: Verifiability,
    run_commands_all_succeeded: bool,
) -> (Friction, Option<GatedAction>) {
    let friction = classify_friction(criticality, reversibility, complexity);
    if friction == Friction::Blocking {
        return (friction, None);
    }
    (friction, Some(classify_action(criticality, reversibility, verifiability, run_commands_all_succeeded)))
}

/// Canonical content hash of a handoff payload, used as `VerificationReceipt::spec_hash`.
pub fn spec_hash(payload: &HandoffPayload) -> String {
    let digest = Sha256::digest(payload.canonical_bytes());
    hex(&digest)
}

/// HMAC-SHA256 signature over `(task_id, spec_hash, verdict, issued_at_ms)`
/// using the per-daemon secret, never transmitted on the wire.
// Allow expect here: HMAC-SHA256 accepts a key of any length, so this never fails.
#[allow(clippy::expect_used)]
fn sign(secret: &[u8], task_id: TaskId, spec_hash: &str, verdict: Verdict, issued_at_ms: u64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts a key of any length");
    mac.update(task_id.as_str().as_bytes());
    mac.update(b"|");
    mac.update(spec_hash.as_bytes());
    mac.update(b"|");
    mac.update(verdict.to_string().as_bytes());
    mac.update(b"|");
    mac.update(issued_at_ms.to_string().as_bytes());
    hex(&mac.finalize().into_bytes())
}

/// Issues a signed [`VerificationReceipt`] binding `verdict` to the exact
/// `payload` supplied — callers must pass the task's own stored payload,
/// never a sibling handoff's, per the testable property in §8.5.
pub fn issue_receipt(
    secret: &[u8],
    task_id: TaskId,
    verifier: impl Into<String>,
    verdict: Verdict,
    payload: &HandoffPayload,
    issued_at_ms: u64,
) -> VerificationReceipt {
    let hash = spec_hash(payload);
    let signature = sign(secret, task_id, &hash, verdict, issued_at_ms);
    VerificationReceipt {
        task_id,
        verifier: verifier.into(),
        verdict,
        spec_hash: hash,
        signature,
        issued_at_ms,
        passed: verdict == Verdict::Accepted,
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hook a council/checkpoint subsystem would implement to adjudicate a
/// `require-elevated-review` handoff. No implementation of this trait
/// ships here; the gate's own response to `GatedAction::RequireElevatedReview`
/// is to surface the request to a human reviewer over the wire instead.
pub trait VerifierHook {
    /// Synchronously decide whether `payload` passes elevated review.
    /// Returning `Ok(true)` accepts the task as if a human had; `Ok(false)`
    /// rejects it; `Err` leaves the task parked in `ready_for_review`.
    fn verify(&self, task_id: TaskId, payload: &HandoffPayload) -> Result<bool, String>;
}
