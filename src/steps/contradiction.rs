//! Stage 4: formulate contradictions and pick the one that stage 6 will
//! score ideas against.

use crate::config::WorkflowConfig;
use crate::controller::{
    call_bounded, missing_upstream, suggestion_error, EditableList, StepController,
};
use crate::error::WorkflowError;
use crate::fingerprint::context_fingerprint;
use crate::model::{ContradictionPayload, StepPayload};
use crate::services::{ContradictionRequest, ContradictionSuggestion, SuggestionService};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use async_trait::async_trait;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContradictionDraft {
    pub contradictions: EditableList,
    pub selected_contradiction: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContradictionController {
    draft: Option<ContradictionDraft>,
    fingerprint: Option<u64>,
}

impl ContradictionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&ContradictionDraft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut ContradictionDraft, WorkflowError> {
        self.draft
            .as_mut()
            .ok_or_else(|| WorkflowError::validation("fetch a suggestion before editing stage 4"))
    }

    pub fn add_contradiction(&mut self, text: impl Into<String>) -> Result<String, WorkflowError> {
        Ok(self.draft_mut()?.contradictions.add(text))
    }

    pub fn edit_contradiction(&mut self, id: &str, text: &str) -> Result<(), WorkflowError> {
        self.draft_mut()?.contradictions.edit(id, text)
    }

    pub fn delete_contradiction(&mut self, id: &str) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        draft.contradictions.delete(id)?;
        if draft.selected_contradiction.as_deref() == Some(id) {
            draft.selected_contradiction = None;
        }
        Ok(())
    }

    pub fn select_contradiction(&mut self, id: &str) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        if !draft.contradictions.contains(id) {
            return Err(WorkflowError::validation(format!(
                "no contradiction with id {}",
                id
            )));
        }
        draft.selected_contradiction = Some(id.to_string());
        Ok(())
    }

    fn apply_suggestion(&mut self, suggestion: ContradictionSuggestion) {
        match self.draft.as_mut() {
            Some(draft) => {
                draft
                    .contradictions
                    .replace_suggestions(&suggestion.contradictions);
                if let Some(selected) = draft.selected_contradiction.clone() {
                    if !draft.contradictions.contains(&selected) {
                        draft.selected_contradiction = None;
                    }
                }
            }
            None => {
                self.draft = Some(ContradictionDraft {
                    contradictions: EditableList::from_suggestions(&suggestion.contradictions),
                    selected_contradiction: None,
                });
            }
        }
    }
}

#[async_trait]
impl StepController for ContradictionController {
    fn step(&self) -> StepIndex {
        StepIndex::Contradiction
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
        let goal = state
            .store
            .goal()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Goal))?;
        let analysis = state
            .store
            .analysis()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Analysis))?;
        let request = ContradictionRequest {
            problem_statement: state.problem_statement.clone(),
            understanding: understanding.clone(),
            goal: goal.clone(),
            analysis: analysis.clone(),
        };
        let fingerprint = context_fingerprint(&request)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;
        if self.draft.is_some() && self.fingerprint == Some(fingerprint) {
            return Ok(());
        }

        let suggestion = call_bounded(
            config.suggestion_timeout(),
            service.suggest_contradiction(&request),
        )
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
            .ok_or_else(|| WorkflowError::validation("stage 4 has no draft to commit"))?;
        match &draft.selected_contradiction {
            Some(id) if draft.contradictions.contains(id) => Ok(()),
            _ => Err(WorkflowError::validation(
                "select a contradiction before advancing to stage 5",
            )),
        }
    }

    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        self.validate()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| WorkflowError::validation("stage 4 has no draft to commit"))?;
        let selected = draft
            .selected_contradiction
            .ok_or_else(|| WorkflowError::validation("select a contradiction before advancing"))?;
        // The selected statement is the evaluation target carried to stage 6.
        let target_ml = draft
            .contradictions
            .items()
            .iter()
            .find(|item| item.id == selected)
            .map(|item| item.text.clone())
            .ok_or_else(|| WorkflowError::validation("the selected contradiction was removed"))?;
        state.store.set(
            StepIndex::Contradiction,
            StepPayload::Contradiction(ContradictionPayload {
                contradictions: draft.contradictions.into_items(),
                selected_contradiction: selected,
                target_ml,
            }),
        );
        state.set_updated_at();
        Ok(())
    }
}

#[cfg(test)]
#[path = "contradiction_tests.rs"]
mod contradiction_tests;
