// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon-owned aggregate (§3, §9): every handler takes a shared
//! reference to this struct rather than reaching for an ad-hoc singleton.
//! Each substructure that needs mutual exclusion gets its own
//! `parking_lot::Mutex` rather than one lock guarding everything, so a
//! slow SQL query never blocks an unrelated in-memory event-bus publish.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hubd_core::{Clock, ProgressReport, SystemClock, TaskId};
use hubd_engine::{EventBus, LauncherPolicy, SharedEventBus};
use hubd_storage::HandoffJournal;
use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::{env, lifecycle::LifecycleError};

/// Per-account bookkeeping for the "exactly one logical connection is
/// current" invariant (§3): authenticating on a new connection cancels
/// whichever token is already registered for that account, and the
/// superseded connection's read loop observes the cancellation and closes.
pub type ConnectionRegistry = Mutex<HashMap<String, (u64, CancellationToken)>>;

pub struct DaemonState<C: Clock = SystemClock> {
    pub base_dir: PathBuf,
    pub config: RwLock<Config>,
    pub clock: C,

    pub db: Mutex<Connection>,
    pub journal: HandoffJournal,
    pub event_bus: SharedEventBus,

    pub launcher_policy: LauncherPolicy,
    pub launch_record: Mutex<hubd_core::AutoLaunchRecord>,

    pub hmac_secret: Vec<u8>,

    pub connections: ConnectionRegistry,
    next_connection_id: std::sync::atomic::AtomicU64,
    /// Most recent [`ProgressReport`] per task, consulted by the SLA scan.
    pub latest_progress: Mutex<HashMap<TaskId, ProgressReport>>,
    /// Tasks that have ever received an `escalate` SLA recommendation —
    /// consulted at `TASK_COMPLETED` to decide `sla_breached` for the
    /// trust-score update (§4.H).
    pub escalated_tasks: Mutex<HashSet<TaskId>>,
    /// Epoch millis the daemon opened this state, for `health_check`'s
    /// uptime figure.
    pub started_at_ms: u64,
    /// Serializes read-modify-write sequences against the handoff journal:
    /// the journal itself does no locking, so two handlers racing on the
    /// same task (e.g. a status update and a progress report) must take
    /// this before reading and hold it through the matching write (§5).
    pub task_lock: Mutex<()>,
}

impl<C: Clock> DaemonState<C> {
    pub fn open(base_dir: PathBuf, config: Config, clock: C) -> Result<Self, LifecycleError> {
        let db = hubd_storage::open_db(&env::db_path(&base_dir)).map_err(|e| LifecycleError::Runtime(e.to_string()))?;
        let journal = HandoffJournal::open(env::journal_dir(&base_dir)).map_err(|e| LifecycleError::Runtime(e.to_string()))?;
        let hmac_secret = load_or_create_hmac_secret(&env::hmac_secret_path(&base_dir))?;
        let launcher_policy = config.policy.launcher_policy();
        let started_at_ms = clock.epoch_ms();

        Ok(Self {
            base_dir,
            config: RwLock::new(config),
            clock,
            db: Mutex::new(db),
            journal,
            event_bus: Arc::new(EventBus::new()),
            launcher_policy,
            launch_record: Mutex::new(hubd_core::AutoLaunchRecord::default()),
            hmac_secret,
            connections: Mutex::new(HashMap::new()),
            next_connection_id: std::sync::atomic::AtomicU64::new(1),
            latest_progress: Mutex::new(HashMap::new()),
            escalated_tasks: Mutex::new(HashSet::new()),
            started_at_ms,
            task_lock: Mutex::new(()),
        })
    }

    pub fn max_depth(&self) -> Option<u32> {
        self.config.read().policy.max_depth
    }

    pub fn token_path(&self, account: &str) -> PathBuf {
        env::token_path(&self.base_dir, account)
    }

    /// An account is treated as quarantined for the SLA lattice and for
    /// `suggest_assignee` filtering when its auto-launcher circuit breaker
    /// is currently open (§4.F, §4.H, §4.I).
    pub fn is_quarantined(&self, account: &str) -> bool {
        let record = self.launch_record.lock();
        record.circuit_breakers.get(account).is_some_and(|b| b.failures >= self.launcher_policy.failure_threshold)
    }

    /// Allocates a new connection id and registers `account`'s connection
    /// as current, cancelling whichever token was previously registered
    /// (the caller emits `ACCOUNT_SUPERSEDED` and lets that connection
    /// observe the cancellation on its own).
    pub fn supersede_connection(&self, account: &str, token: CancellationToken) -> u64 {
        let id = self.next_connection_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut connections = self.connections.lock();
        let previous = connections.insert(account.to_string(), (id, token));
        if let Some((_, previous_token)) = previous {
            previous_token.cancel();
        }
        id
    }

    /// Removes `account`'s registry entry only if it is still the
    /// connection identified by `id` — a superseded connection's own
    /// cleanup must not evict whatever connection superseded it.
    pub fn drop_connection_if_current(&self, account: &str, id: u64) {
        let mut connections = self.connections.lock();
        if connections.get(account).is_some_and(|(current_id, _)| *current_id == id) {
            connections.remove(account);
        }
    }

    pub fn record_progress(&self, report: ProgressReport) {
        self.latest_progress.lock().insert(report.task_id, report);
    }

    pub fn latest_progress_for(&self, task_id: &TaskId) -> Option<ProgressReport> {
        self.latest_progress.lock().get(task_id).cloned()
    }

    pub fn mark_escalated(&self, task_id: TaskId) {
        self.escalated_tasks.lock().insert(task_id);
    }

    pub fn was_escalated(&self, task_id: &TaskId) -> bool {
        self.escalated_tasks.lock().contains(task_id)
    }
}

fn load_or_create_hmac_secret(path: &Path) -> Result<Vec<u8>, LifecycleError> {
    if path.exists() {
        let contents = std::fs::read(path).map_err(LifecycleError::Io)?;
        return Ok(contents);
    }
    let secret = nanoid::nanoid!(48).into_bytes();
    hubd_storage::atomic::replace(path, &secret).map_err(LifecycleError::Io)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(secret)
}
