//! The six-slot workflow store and the session state wrapping it.
//!
//! The store is deliberately dumb: `get`/`set` per slot, full replace, no
//! cross-slot consistency checks. Dependency reading is the callers' job --
//! a stage controller reads the upstream slots it needs before writing its
//! own. Slots are only ever overwritten, never deleted, so backward
//! navigation never loses downstream data.

use crate::model::{
    AnalysisPayload, ContradictionPayload, EvaluationPayload, GoalPayload, IdeationPayload,
    StepPayload, UnderstandingPayload,
};
use crate::step::StepIndex;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Six named payload slots, one per stage. A slot is `None` until its stage
/// commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStore {
    step1: Option<StepPayload>,
    step2: Option<StepPayload>,
    step3: Option<StepPayload>,
    step4: Option<StepPayload>,
    step5: Option<StepPayload>,
    step6: Option<StepPayload>,
}

impl WorkflowStore {
    fn slot(&self, step: StepIndex) -> &Option<StepPayload> {
        match step {
            StepIndex::Understanding => &self.step1,
            StepIndex::Goal => &self.step2,
            StepIndex::Analysis => &self.step3,
            StepIndex::Contradiction => &self.step4,
            StepIndex::Ideation => &self.step5,
            StepIndex::Evaluation => &self.step6,
        }
    }

    fn slot_mut(&mut self, step: StepIndex) -> &mut Option<StepPayload> {
        match step {
            StepIndex::Understanding => &mut self.step1,
            StepIndex::Goal => &mut self.step2,
            StepIndex::Analysis => &mut self.step3,
            StepIndex::Contradiction => &mut self.step4,
            StepIndex::Ideation => &mut self.step5,
            StepIndex::Evaluation => &mut self.step6,
        }
    }

    /// Reads a slot. `None` means the stage has not committed yet.
    pub fn get(&self, step: StepIndex) -> Option<&StepPayload> {
        self.slot(step).as_ref()
    }

    /// Writes a slot. Full replace, not a merge.
    pub fn set(&mut self, step: StepIndex, payload: StepPayload) {
        *self.slot_mut(step) = Some(payload);
    }

    /// Typed accessor for the stage 1 payload. `None` if the slot is empty
    /// or holds a different variant.
    pub fn understanding(&self) -> Option<&UnderstandingPayload> {
        match self.get(StepIndex::Understanding)? {
            StepPayload::Understanding(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn goal(&self) -> Option<&GoalPayload> {
        match self.get(StepIndex::Goal)? {
            StepPayload::Goal(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisPayload> {
        match self.get(StepIndex::Analysis)? {
            StepPayload::Analysis(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn contradiction(&self) -> Option<&ContradictionPayload> {
        match self.get(StepIndex::Contradiction)? {
            StepPayload::Contradiction(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn ideation(&self) -> Option<&IdeationPayload> {
        match self.get(StepIndex::Ideation)? {
            StepPayload::Ideation(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn evaluation(&self) -> Option<&EvaluationPayload> {
        match self.get(StepIndex::Evaluation)? {
            StepPayload::Evaluation(payload) => Some(payload),
            _ => None,
        }
    }
}

/// A full problem-solving session: identity, the initial problem statement
/// feeding stage 1, and the six payload slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub session_id: String,
    /// The user's original problem description; stage 1's suggestion context.
    pub problem_statement: String,
    pub created_at: String,
    pub updated_at: String,
    pub store: WorkflowStore,
}

impl WorkflowState {
    pub fn new(problem_statement: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            session_id: Uuid::new_v4().to_string(),
            problem_statement: problem_statement.into(),
            created_at: now.clone(),
            updated_at: now,
            store: WorkflowStore::default(),
        }
    }

    pub fn set_updated_at(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
