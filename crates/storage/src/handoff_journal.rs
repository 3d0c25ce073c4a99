// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task & handoff journal: one file per task, named by its id, so a
//! crash mid-write only ever threatens the single task being written —
//! every other task's file is untouched (§4.D).
//!
//! Completed tasks (`Accepted` or `Rejected`) move to an `archive/`
//! subdirectory on the next `archive_completed` sweep, keeping the live
//! directory scoped to tasks still in flight.

use hubd_core::{HubError, Task, TaskId};
use std::fs;
use std::path::{Path, PathBuf};

use crate::atomic;

pub struct HandoffJournal {
    root: PathBuf,
}

impl HandoffJournal {
    /// `root` is the journal's base directory; `root/archive` is created
    /// alongside it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, HubError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        fs::create_dir_all(root.join("archive"))?;
        Ok(Self { root })
    }

    fn live_path(&self, id: &TaskId) -> PathBuf {
        self.root.join(format!("{}.json", id.as_str()))
    }

    fn archive_path(&self, id: &TaskId) -> PathBuf {
        self.root.join("archive").join(format!("{}.json", id.as_str()))
    }

    /// Creates a new task file. Errors if one already exists for this id —
    /// a handoff produces exactly one task, never an overwrite.
    pub fn create(&self, task: &Task) -> Result<(), HubError> {
        let path = self.live_path(&task.id);
        if path.exists() {
            return Err(HubError::validation(format!("task {} already exists in journal", task.id)));
        }
        self.write(&path, task)
    }

    /// Persists an updated task (status transitions, progress, workspace
    /// binding). The file must already exist in the live directory.
    pub fn save(&self, task: &Task) -> Result<(), HubError> {
        let path = self.live_path(&task.id);
        self.write(&path, task)
    }

    fn write(&self, path: &Path, task: &Task) -> Result<(), HubError> {
        let bytes = serde_json::to_vec_pretty(task)?;
        atomic::replace(path, &bytes)?;
        Ok(())
    }

    pub fn load(&self, id: &TaskId) -> Result<Option<Task>, HubError> {
        let path = self.live_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn list_live(&self) -> Result<Vec<Task>, HubError> {
        self.list_dir(&self.root)
    }

    /// Lists every task already moved to `archive/` — the history
    /// `suggest_assignee` draws `medianCompletionMinutes` and
    /// `lastAcceptedAt` from (§4.H).
    pub fn list_archived(&self) -> Result<Vec<Task>, HubError> {
        self.list_dir(&self.root.join("archive"))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<Task>, HubError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        out.sort_by_key(|t: &Task| t.created_at_ms);
        Ok(out)
    }

    /// Moves every terminal (`Accepted`/`Rejected`) task currently in the
    /// live directory into `archive/`. Returns the count moved.
    pub fn archive_completed(&self) -> Result<u64, HubError> {
        let mut moved = 0u64;
        for task in self.list_live()? {
            if task.status.is_terminal() {
                let from = self.live_path(&task.id);
                let to = self.archive_path(&task.id);
                fs::rename(&from, &to)?;
                moved += 1;
            }
        }
        Ok(moved)
    }
}
