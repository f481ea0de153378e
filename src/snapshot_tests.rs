//! Tests for snapshot persistence.

use super::*;
use crate::test_support::state_through;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_through(StepIndex::Ideation);
    let path = dir.path().join(&state.session_id).join("session.json");
    let snapshot = SessionSnapshot::new(state);
    snapshot.save_to(&path).unwrap();

    let loaded = SessionSnapshot::load_from(&path).unwrap();
    assert_eq!(loaded.version, SNAPSHOT_VERSION);
    assert_eq!(loaded.state.session_id, snapshot.state.session_id);
    assert!(loaded.state.store.ideation().is_some());
    assert!(loaded.state.store.evaluation().is_none());
}

#[test]
fn test_load_rejects_future_versions() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_through(StepIndex::Understanding);
    let path = dir.path().join("s").join("session.json");
    let mut snapshot = SessionSnapshot::new(state);
    snapshot.version = SNAPSHOT_VERSION + 1;
    snapshot.save_to(&path).unwrap();

    let err = SessionSnapshot::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("version"));
}

#[test]
fn test_save_does_not_leave_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_through(StepIndex::Goal);
    let path = dir.path().join("s").join("session.json");
    SessionSnapshot::new(state).save_to(&path).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path().join("s"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["session.json"]);
}

#[test]
fn test_listing_skips_unreadable_entries_and_sorts_recent_first() {
    let dir = tempfile::tempdir().unwrap();

    let mut older = SessionSnapshot::new(state_through(StepIndex::Understanding));
    older.saved_at = "2026-01-01T00:00:00+00:00".to_string();
    older
        .save_to(&dir.path().join("older").join("session.json"))
        .unwrap();

    let mut newer = SessionSnapshot::new(state_through(StepIndex::Ideation));
    newer.saved_at = "2026-02-01T00:00:00+00:00".to_string();
    newer
        .save_to(&dir.path().join("newer").join("session.json"))
        .unwrap();

    let broken = dir.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("session.json"), "not json").unwrap();

    let infos = list_sessions_in(dir.path()).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].saved_at, newer.saved_at);
    assert_eq!(infos[0].furthest_step, Some(StepIndex::Ideation));
    assert_eq!(infos[1].furthest_step, Some(StepIndex::Understanding));
}

#[test]
fn test_info_on_empty_store() {
    let state = WorkflowState::new("does the pump cavitate under load?");
    let info = SessionSnapshot::new(state).info();
    assert_eq!(info.furthest_step, None);
    assert!(!info.session_id.is_empty());
}
