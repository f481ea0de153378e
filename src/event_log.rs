//! Structured JSONL event log for debugging and session reconstruction.
//!
//! One line per event: monotonic sequence number, RFC3339 timestamp, session
//! id, emitting component, and the event body as JSON. Logging is
//! best-effort; a failed write never fails the workflow.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct EventLog {
    session_id: String,
    seq: AtomicU64,
    file: Mutex<File>,
    path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number, unique within the session.
    pub seq: u64,
    /// RFC3339 timestamp.
    pub ts: String,
    pub session_id: String,
    /// Component that emitted the event ("pipeline", "controller", ...).
    pub component: String,
    pub event: Value,
}

impl EventLog {
    /// Opens (or creates) `<dir>/events.jsonl` in append mode. The sequence
    /// counter resumes after the last existing line, so reopening a
    /// session's log keeps `seq` unique across restarts.
    pub fn new(session_id: &str, dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("events.jsonl");
        let existing = std::fs::read_to_string(&path)
            .map(|content| content.lines().count() as u64)
            .unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            session_id: session_id.to_string(),
            seq: AtomicU64::new(existing),
            file: Mutex::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event as a single JSON line. Thread-safe; best-effort.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let event = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("failed to serialize log event: {}", err);
                return;
            }
        };
        let entry = LogEntry {
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            ts: Utc::now().to_rfc3339(),
            session_id: self.session_id.clone(),
            component: component.to_string(),
            event,
        };
        let Ok(line) = serde_json::to_string(&entry) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestEvent {
        kind: &'static str,
        idea_id: u64,
    }

    #[test]
    fn test_entries_are_ordered_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new("session-1", dir.path()).unwrap();
        log.log(
            "pipeline",
            TestEvent {
                kind: "dispatched",
                idea_id: 1,
            },
        );
        log.log(
            "pipeline",
            TestEvent {
                kind: "resolved",
                idea_id: 1,
            },
        );

        let content = std::fs::read_to_string(log.path()).unwrap();
        let entries: Vec<LogEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 2);
        assert_eq!(entries[0].session_id, "session-1");
        assert_eq!(entries[1].event["kind"], "resolved");
    }

    #[test]
    fn test_reopening_continues_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        {
            let log = EventLog::new("s", dir.path()).unwrap();
            log.log("pipeline", TestEvent { kind: "a", idea_id: 1 });
        }
        let log = EventLog::new("s", dir.path()).unwrap();
        log.log("pipeline", TestEvent { kind: "b", idea_id: 2 });

        let content = std::fs::read_to_string(log.path()).unwrap();
        let entries: Vec<LogEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        // seq picks up where the previous run left off.
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[1].seq, 2);
    }
}
