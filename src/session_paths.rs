//! Centralized home-based storage paths for session persistence.
//!
//! All on-disk state lives under `~/.triz-session/`:
//! - `sessions/<session-id>/session.json` - Session snapshots
//! - `sessions/<session-id>/events.jsonl` - Structured event log

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the application home directory.
const APP_DIR: &str = ".triz-session";

/// Returns the application home directory: `~/.triz-session/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn app_home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory for session storage")?;
    let app_dir = home.join(APP_DIR);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {}", app_dir.display()))?;
    Ok(app_dir)
}

/// Returns the sessions directory: `~/.triz-session/sessions/`
///
/// Creates the directory if it doesn't exist.
pub fn sessions_dir() -> Result<PathBuf> {
    let dir = app_home_dir()?.join("sessions");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create sessions directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the session directory: `~/.triz-session/sessions/<session-id>/`
///
/// Creates the directory if it doesn't exist.
pub fn session_dir(session_id: &str) -> Result<PathBuf> {
    let dir = sessions_dir()?.join(session_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the session snapshot file: `~/.triz-session/sessions/<session-id>/session.json`
pub fn session_snapshot_path(session_id: &str) -> Result<PathBuf> {
    Ok(session_dir(session_id)?.join("session.json"))
}

/// Returns the session event log file: `~/.triz-session/sessions/<session-id>/events.jsonl`
pub fn session_events_path(session_id: &str) -> Result<PathBuf> {
    Ok(session_dir(session_id)?.join("events.jsonl"))
}
