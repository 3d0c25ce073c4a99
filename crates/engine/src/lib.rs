// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hubd-engine: the pure decision logic of the agent hub daemon.
//!
//! Everything here is deliberately free of I/O — sockets, SQL, and the
//! filesystem stay in `hubd-wire`/`hubd-storage`/the daemon binary. This
//! crate holds only the rules: sanitization and structural validation of
//! a handoff, delegation-depth enforcement, the SLA threshold lattice, the
//! auto-acceptance gate and receipt signing, trust/reputation scoring and
//! assignee suggestion, the auto-launcher policy, and the in-memory event
//! bus that ties state changes to subscribers.

pub mod bus;
pub mod depth;
pub mod gate;
pub mod launcher;
pub mod sanitize;
pub mod sla;
pub mod trust;
pub mod validate;

pub use bus::{EventBus, SharedEventBus};
pub use gate::{classify, classify_action, classify_friction, issue_receipt, spec_hash, Friction, GatedAction};
pub use launcher::{DenyReason, LaunchDecision, LauncherPolicy};
pub use sanitize::{sanitize, SanitizationWarnings};
pub use sla::{evaluate as evaluate_sla, scan as scan_sla, SlaAssessment, SlaRecommendation};
pub use trust::{suggest_assignee, update_on_completion, AssigneeCandidate, AssigneeScore};
pub use validate::validate;
