//! Stage 2: define the goal and constraints; carry scope and the Ideal
//! Final Result as read-only context.

use crate::config::WorkflowConfig;
use crate::controller::{
    call_bounded, missing_upstream, suggestion_error, EditableList, StepController,
};
use crate::error::WorkflowError;
use crate::fingerprint::context_fingerprint;
use crate::model::{GoalPayload, StepPayload};
use crate::services::{GoalRequest, GoalSuggestion, SuggestionService};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub goal: String,
    pub constraints: EditableList,
    /// Read-only framing carried forward for display.
    pub scope: String,
    pub ideal_final_result: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalController {
    draft: Option<GoalDraft>,
    fingerprint: Option<u64>,
}

impl GoalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&GoalDraft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut GoalDraft, WorkflowError> {
        self.draft
            .as_mut()
            .ok_or_else(|| WorkflowError::validation("fetch a suggestion before editing stage 2"))
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) -> Result<(), WorkflowError> {
        self.draft_mut()?.goal = goal.into();
        Ok(())
    }

    pub fn add_constraint(&mut self, text: impl Into<String>) -> Result<String, WorkflowError> {
        Ok(self.draft_mut()?.constraints.add(text))
    }

    pub fn edit_constraint(&mut self, id: &str, text: &str) -> Result<(), WorkflowError> {
        self.draft_mut()?.constraints.edit(id, text)
    }

    pub fn delete_constraint(&mut self, id: &str) -> Result<(), WorkflowError> {
        self.draft_mut()?.constraints.delete(id)
    }

    fn apply_suggestion(&mut self, suggestion: GoalSuggestion) {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.goal = suggestion.goal;
                draft.scope = suggestion.scope;
                draft.ideal_final_result = suggestion.ideal_final_result;
                draft.constraints.replace_suggestions(&suggestion.constraints);
            }
            None => {
                self.draft = Some(GoalDraft {
                    goal: suggestion.goal,
                    constraints: EditableList::from_suggestions(&suggestion.constraints),
                    scope: suggestion.scope,
                    ideal_final_result: suggestion.ideal_final_result,
                });
            }
        }
    }
}

#[async_trait]
impl StepController for GoalController {
    fn step(&self) -> StepIndex {
        StepIndex::Goal
    }

    async fn suggest(
        &mut self,
        state: &WorkflowState,
        service: &dyn SuggestionService,
        config: &WorkflowConfig,
    ) -> Result<(), WorkflowError> {
        let understanding = state
            .store
            .understanding()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Understanding))?;
        let request = GoalRequest {
            problem_statement: state.problem_statement.clone(),
            understanding: understanding.clone(),
        };
        let fingerprint = context_fingerprint(&request)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;
        if self.draft.is_some() && self.fingerprint == Some(fingerprint) {
            return Ok(());
        }

        let suggestion = call_bounded(config.suggestion_timeout(), service.suggest_goal(&request))
            .await
            .map_err(|failure| suggestion_error(self.step(), failure))?;

        self.apply_suggestion(suggestion);
        self.fingerprint = Some(fingerprint);
        Ok(())
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| WorkflowError::validation("stage 2 has no draft to commit"))?;
        if draft.goal.trim().is_empty() {
            return Err(WorkflowError::validation(
                "the goal must not be empty",
            ));
        }
        Ok(())
    }

    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        self.validate()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| WorkflowError::validation("stage 2 has no draft to commit"))?;
        state.store.set(
            StepIndex::Goal,
            StepPayload::Goal(GoalPayload {
                goal: draft.goal.trim().to_string(),
                constraints: draft.constraints.into_items(),
                scope: draft.scope,
                ideal_final_result: draft.ideal_final_result,
            }),
        );
        state.set_updated_at();
        Ok(())
    }
}

#[cfg(test)]
#[path = "goal_tests.rs"]
mod goal_tests;
