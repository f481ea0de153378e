//! Session snapshot persistence for stop/resume functionality.
//!
//! Each snapshot contains exactly one workflow session. Snapshots are
//! versioned JSON written atomically (temp file then rename) so a crash
//! mid-save never corrupts an existing snapshot.
//!
//! Snapshot location: `~/.triz-session/sessions/<session-id>/session.json`

use crate::session_paths;
use crate::step::StepIndex;
use crate::store::WorkflowState;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current snapshot format version.
/// Increment this when making breaking changes to the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A persistable snapshot of a workflow session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Snapshot format version for migration compatibility
    pub version: u32,
    /// Timestamp when this snapshot was created (RFC3339 format)
    pub saved_at: String,
    /// The workflow state at time of snapshot
    pub state: WorkflowState,
}

/// Information about a session snapshot for listing purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshotInfo {
    pub session_id: String,
    pub problem_statement: String,
    /// Highest step with a committed payload, if any.
    pub furthest_step: Option<StepIndex>,
    pub saved_at: String,
}

impl SessionSnapshot {
    /// Creates a new snapshot with the current timestamp.
    pub fn new(state: WorkflowState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            state,
        }
    }

    /// Saves the snapshot to its home location for the session id.
    pub fn save(&self) -> Result<()> {
        let path = session_paths::session_snapshot_path(&self.state.session_id)?;
        self.save_to(&path)
    }

    /// Saves the snapshot to an explicit path, atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .with_context(|| "Failed to serialize session snapshot")?;
        write_atomic(path, &content)
    }

    /// Loads the snapshot for a session id from its home location.
    pub fn load(session_id: &str) -> Result<Self> {
        let path = session_paths::session_snapshot_path(session_id)?;
        Self::load_from(&path)
    }

    /// Loads a snapshot from an explicit path, rejecting unknown versions.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let snapshot: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            bail!(
                "Snapshot {} has version {} but this build supports up to {}",
                path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(snapshot)
    }

    /// Summary used for session listings.
    pub fn info(&self) -> SessionSnapshotInfo {
        let furthest_step = StepIndex::ALL
            .iter()
            .copied()
            .rev()
            .find(|step| self.state.store.get(*step).is_some());
        SessionSnapshotInfo {
            session_id: self.state.session_id.clone(),
            problem_statement: self.state.problem_statement.clone(),
            furthest_step,
            saved_at: self.saved_at.clone(),
        }
    }
}

/// Lists all resumable snapshots under the home sessions directory,
/// most recent first.
pub fn list_sessions() -> Result<Vec<SessionSnapshotInfo>> {
    list_sessions_in(&session_paths::sessions_dir()?)
}

/// Lists snapshots under an explicit sessions directory. Unreadable or
/// foreign files are skipped rather than failing the whole listing.
pub fn list_sessions_in(dir: &Path) -> Result<Vec<SessionSnapshotInfo>> {
    let mut sessions = Vec::new();
    if !dir.exists() {
        return Ok(sessions);
    }
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read sessions directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path().join("session.json");
        if !path.is_file() {
            continue;
        }
        match SessionSnapshot::load_from(&path) {
            Ok(snapshot) => sessions.push(snapshot.info()),
            Err(err) => tracing::warn!("skipping snapshot {}: {}", path.display(), err),
        }
    }
    sessions.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
    Ok(sessions)
}

/// Writes content to a temp file in the target directory and renames it
/// into place.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("Snapshot path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write snapshot temp file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move snapshot into place: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod snapshot_tests;
