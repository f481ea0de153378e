//! Stage 1: understand the problem and narrow it to one mini-problem.

use crate::config::WorkflowConfig;
use crate::controller::{
    call_bounded, suggestion_error, EditableList, StepController,
};
use crate::error::WorkflowError;
use crate::fingerprint::context_fingerprint;
use crate::model::{StepPayload, SystemContext, UnderstandingPayload};
use crate::services::{SuggestionService, UnderstandingRequest, UnderstandingSuggestion};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use async_trait::async_trait;

/// The stage 1 draft under edit. Suggestion-owned fields are read-only
/// context; the mini-problem list and its selection are user-editable.
#[derive(Debug, Clone, PartialEq)]
pub struct UnderstandingDraft {
    pub understanding: String,
    pub understanding_summary: String,
    pub system_context: SystemContext,
    pub psychological_inertia: Vec<String>,
    pub mini_problems: EditableList,
    pub selected_mini_problem: Option<String>,
    pub clarification_needed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct UnderstandingController {
    draft: Option<UnderstandingDraft>,
    fingerprint: Option<u64>,
}

impl UnderstandingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&UnderstandingDraft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut UnderstandingDraft, WorkflowError> {
        self.draft
            .as_mut()
            .ok_or_else(|| WorkflowError::validation("fetch a suggestion before editing stage 1"))
    }

    /// Appends a user-authored mini-problem and returns its id.
    pub fn add_mini_problem(&mut self, text: impl Into<String>) -> Result<String, WorkflowError> {
        Ok(self.draft_mut()?.mini_problems.add(text))
    }

    pub fn edit_mini_problem(&mut self, id: &str, text: &str) -> Result<(), WorkflowError> {
        self.draft_mut()?.mini_problems.edit(id, text)
    }

    /// Removes a mini-problem; a selection pointing at it is cleared.
    pub fn delete_mini_problem(&mut self, id: &str) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        draft.mini_problems.delete(id)?;
        if draft.selected_mini_problem.as_deref() == Some(id) {
            draft.selected_mini_problem = None;
        }
        Ok(())
    }

    pub fn select_mini_problem(&mut self, id: &str) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        if !draft.mini_problems.contains(id) {
            return Err(WorkflowError::validation(format!(
                "no mini-problem with id {}",
                id
            )));
        }
        draft.selected_mini_problem = Some(id.to_string());
        Ok(())
    }

    fn apply_suggestion(&mut self, suggestion: UnderstandingSuggestion) {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.understanding = suggestion.understanding;
                draft.understanding_summary = suggestion.understanding_summary;
                draft.system_context = suggestion.system_context;
                draft.psychological_inertia = suggestion.psychological_inertia;
                draft.clarification_needed = suggestion.clarification_needed;
                draft
                    .mini_problems
                    .replace_suggestions(&suggestion.mini_problems);
                // The selection may have pointed at a replaced suggestion.
                if let Some(selected) = draft.selected_mini_problem.clone() {
                    if !draft.mini_problems.contains(&selected) {
                        draft.selected_mini_problem = None;
                    }
                }
            }
            None => {
                self.draft = Some(UnderstandingDraft {
                    understanding: suggestion.understanding,
                    understanding_summary: suggestion.understanding_summary,
                    system_context: suggestion.system_context,
                    psychological_inertia: suggestion.psychological_inertia,
                    mini_problems: EditableList::from_suggestions(&suggestion.mini_problems),
                    selected_mini_problem: None,
                    clarification_needed: suggestion.clarification_needed,
                });
            }
        }
    }
}

#[async_trait]
impl StepController for UnderstandingController {
    fn step(&self) -> StepIndex {
        StepIndex::Understanding
    }

    async fn suggest(
        &mut self,
        state: &WorkflowState,
        service: &dyn SuggestionService,
        config: &WorkflowConfig,
    ) -> Result<(), WorkflowError> {
        let request = UnderstandingRequest {
            problem_statement: state.problem_statement.clone(),
        };
        let fingerprint = context_fingerprint(&request)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;
        if self.draft.is_some() && self.fingerprint == Some(fingerprint) {
            return Ok(());
        }

        let suggestion = call_bounded(
            config.suggestion_timeout(),
            service.suggest_understanding(&request),
        )
        .await
        .map_err(|failure| suggestion_error(self.step(), failure))?;

        tracing::debug!(step = %self.step(), "applying stage 1 suggestion");
        self.apply_suggestion(suggestion);
        self.fingerprint = Some(fingerprint);
        Ok(())
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| WorkflowError::validation("stage 1 has no draft to commit"))?;
        match &draft.selected_mini_problem {
            Some(id) if draft.mini_problems.contains(id) => Ok(()),
            _ => Err(WorkflowError::validation(
                "select a mini-problem before advancing to stage 2",
            )),
        }
    }

    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        self.validate()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| WorkflowError::validation("stage 1 has no draft to commit"))?;
        let selected = draft
            .selected_mini_problem
            .ok_or_else(|| WorkflowError::validation("select a mini-problem before advancing"))?;
        state.store.set(
            StepIndex::Understanding,
            StepPayload::Understanding(UnderstandingPayload {
                understanding: draft.understanding,
                understanding_summary: draft.understanding_summary,
                system_context: draft.system_context,
                psychological_inertia: draft.psychological_inertia,
                mini_problems: draft.mini_problems.into_items(),
                selected_mini_problem: selected,
                clarification_needed: draft.clarification_needed,
            }),
        );
        state.set_updated_at();
        Ok(())
    }
}

#[cfg(test)]
#[path = "understanding_tests.rs"]
mod understanding_tests;
