// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic internal timer driving the SLA stale-task scan (§4.F, §9):
//! one ticker started at daemon startup and stopped deterministically on
//! shutdown, rather than an ad hoc timer scattered through handlers.

use std::sync::Arc;
use std::time::Duration;

use hubd_core::Clock;
use hubd_engine::SlaRecommendation;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::state::DaemonState;

pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns the ticker task. Cancelling `shutdown` stops it before the next
/// tick rather than mid-scan.
pub fn spawn<C: Clock + Send + Sync + 'static>(
    state: Arc<DaemonState<C>>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => tick(&state),
            }
        }
    })
}

fn tick<C: Clock>(state: &DaemonState<C>) {
    let now = state.clock.epoch_ms();
    let tasks = match state.journal.list_live() {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "sla scan failed to list live tasks");
            return;
        }
    };

    let assessments = hubd_engine::scan_sla(now, &tasks, |task_id| state.latest_progress_for(task_id), |assignee| {
        state.is_quarantined(assignee)
    });

    for assessment in &assessments {
        if assessment.recommendation == SlaRecommendation::Escalate {
            state.mark_escalated(assessment.task_id);
        }
        debug!(task_id = %assessment.task_id, recommendation = ?assessment.recommendation, "sla scan recommendation");
    }
}
