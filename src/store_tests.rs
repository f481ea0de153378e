//! Tests for the workflow store and session state.

use super::*;
use crate::test_support::{
    analysis_payload, contradiction_payload, goal_payload, idea, ideation_payload,
    understanding_payload,
};

fn payload_for(step: StepIndex) -> StepPayload {
    match step {
        StepIndex::Understanding => StepPayload::Understanding(understanding_payload()),
        StepIndex::Goal => StepPayload::Goal(goal_payload()),
        StepIndex::Analysis => StepPayload::Analysis(analysis_payload()),
        StepIndex::Contradiction => StepPayload::Contradiction(contradiction_payload()),
        StepIndex::Ideation => StepPayload::Ideation(ideation_payload(vec![idea(1, "pulse")])),
        StepIndex::Evaluation => StepPayload::Evaluation(EvaluationPayload::default()),
    }
}

#[test]
fn test_set_then_get_round_trips_every_slot() {
    let mut store = WorkflowStore::default();
    for step in StepIndex::ALL {
        let payload = payload_for(step);
        store.set(step, payload.clone());
        assert_eq!(store.get(step), Some(&payload));
    }
}

#[test]
fn test_uncommitted_slot_reads_none() {
    let store = WorkflowStore::default();
    for step in StepIndex::ALL {
        assert_eq!(store.get(step), None);
    }
}

#[test]
fn test_set_is_full_replace() {
    let mut store = WorkflowStore::default();
    store.set(StepIndex::Goal, payload_for(StepIndex::Goal));

    let mut replacement = goal_payload();
    replacement.goal = "a different goal".to_string();
    store.set(StepIndex::Goal, StepPayload::Goal(replacement.clone()));

    assert_eq!(store.goal(), Some(&replacement));
}

#[test]
fn test_writing_one_slot_leaves_others_untouched() {
    let mut store = WorkflowStore::default();
    store.set(StepIndex::Understanding, payload_for(StepIndex::Understanding));
    store.set(StepIndex::Ideation, payload_for(StepIndex::Ideation));

    // Overwriting step 1 must not clear the downstream slot.
    store.set(StepIndex::Understanding, payload_for(StepIndex::Understanding));
    assert!(store.ideation().is_some());
    assert_eq!(store.get(StepIndex::Goal), None);
}

#[test]
fn test_typed_accessor_rejects_wrong_variant() {
    let mut store = WorkflowStore::default();
    // The store performs no validation: a mismatched write is accepted...
    store.set(StepIndex::Understanding, payload_for(StepIndex::Goal));
    assert!(store.get(StepIndex::Understanding).is_some());
    // ...but the typed accessor refuses to read it as stage 1 data.
    assert_eq!(store.understanding(), None);
}

#[test]
fn test_state_serde_round_trip() {
    let mut state = WorkflowState::new("server cooling fails at peak load");
    state.store.set(StepIndex::Analysis, payload_for(StepIndex::Analysis));

    let json = serde_json::to_string(&state).unwrap();
    let restored: WorkflowState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);
}

#[test]
fn test_set_updated_at_moves_forward() {
    let mut state = WorkflowState::new("p");
    let before = state.updated_at.clone();
    state.set_updated_at();
    assert!(state.updated_at >= before);
    assert_eq!(state.created_at, before);
}
