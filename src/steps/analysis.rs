//! Stage 3: identify the system, its elements, and the state each element
//! must reach for the goal to hold.

use crate::config::WorkflowConfig;
use crate::controller::{
    call_bounded, missing_upstream, suggestion_error, EditableList, StepController,
};
use crate::error::WorkflowError;
use crate::fingerprint::context_fingerprint;
use crate::model::{AnalysisPayload, StepPayload};
use crate::services::{AnalysisRequest, AnalysisSuggestion, SuggestionService};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisDraft {
    pub system_identified: String,
    elements: Vec<String>,
    required_states: BTreeMap<String, EditableList>,
}

impl AnalysisDraft {
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn required_states_for(&self, element: &str) -> Option<&EditableList> {
        self.required_states.get(element)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisController {
    draft: Option<AnalysisDraft>,
    fingerprint: Option<u64>,
}

impl AnalysisController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&AnalysisDraft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut AnalysisDraft, WorkflowError> {
        self.draft
            .as_mut()
            .ok_or_else(|| WorkflowError::validation("fetch a suggestion before editing stage 3"))
    }

    /// Adds an element with an initially empty required-state list.
    pub fn add_element(&mut self, name: impl Into<String>) -> Result<(), WorkflowError> {
        let name = name.into();
        let trimmed = name.trim().to_string();
        if trimmed.is_empty() {
            return Err(WorkflowError::validation("element names must not be empty"));
        }
        let draft = self.draft_mut()?;
        if draft.elements.contains(&trimmed) {
            return Err(WorkflowError::validation(format!(
                "element '{}' already exists",
                trimmed
            )));
        }
        draft.elements.push(trimmed.clone());
        draft.required_states.entry(trimmed).or_default();
        Ok(())
    }

    /// Removes an element together with its required states.
    pub fn remove_element(&mut self, name: &str) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        let before = draft.elements.len();
        draft.elements.retain(|element| element != name);
        if draft.elements.len() == before {
            return Err(WorkflowError::validation(format!(
                "no element named '{}'",
                name
            )));
        }
        draft.required_states.remove(name);
        Ok(())
    }

    pub fn add_required_state(
        &mut self,
        element: &str,
        text: impl Into<String>,
    ) -> Result<String, WorkflowError> {
        let list = self.states_mut(element)?;
        Ok(list.add(text))
    }

    pub fn edit_required_state(
        &mut self,
        element: &str,
        id: &str,
        text: &str,
    ) -> Result<(), WorkflowError> {
        self.states_mut(element)?.edit(id, text)
    }

    pub fn delete_required_state(&mut self, element: &str, id: &str) -> Result<(), WorkflowError> {
        self.states_mut(element)?.delete(id)
    }

    fn states_mut(&mut self, element: &str) -> Result<&mut EditableList, WorkflowError> {
        self.draft_mut()?
            .required_states
            .get_mut(element)
            .ok_or_else(|| WorkflowError::validation(format!("no element named '{}'", element)))
    }

    fn apply_suggestion(&mut self, suggestion: AnalysisSuggestion) {
        let mut required_states: BTreeMap<String, EditableList> = BTreeMap::new();
        let previous = self.draft.take();
        for element in &suggestion.elements {
            let texts = suggestion
                .required_states
                .get(element)
                .cloned()
                .unwrap_or_default();
            let mut list = previous
                .as_ref()
                .and_then(|draft| draft.required_states.get(element).cloned())
                .unwrap_or_default();
            list.replace_suggestions(&texts);
            required_states.insert(element.clone(), list);
        }
        self.draft = Some(AnalysisDraft {
            system_identified: suggestion.system_identified,
            elements: suggestion.elements,
            required_states,
        });
    }
}

#[async_trait]
impl StepController for AnalysisController {
    fn step(&self) -> StepIndex {
        StepIndex::Analysis
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
        let request = AnalysisRequest {
            problem_statement: state.problem_statement.clone(),
            understanding: understanding.clone(),
            goal: goal.clone(),
        };
        let fingerprint = context_fingerprint(&request)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;
        if self.draft.is_some() && self.fingerprint == Some(fingerprint) {
            return Ok(());
        }

        let suggestion = call_bounded(
            config.suggestion_timeout(),
            service.suggest_analysis(&request),
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
            .ok_or_else(|| WorkflowError::validation("stage 3 has no draft to commit"))?;
        for element in &draft.elements {
            let has_states = draft
                .required_states
                .get(element)
                .is_some_and(|list| !list.is_empty());
            if !has_states {
                return Err(WorkflowError::validation(format!(
                    "element '{}' needs at least one required state before advancing",
                    element
                )));
            }
        }
        Ok(())
    }

    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        self.validate()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| WorkflowError::validation("stage 3 has no draft to commit"))?;
        let required_states = draft
            .required_states
            .into_iter()
            .map(|(element, list)| (element, list.into_items()))
            .collect();
        state.store.set(
            StepIndex::Analysis,
            StepPayload::Analysis(AnalysisPayload {
                system_identified: draft.system_identified,
                elements: draft.elements,
                required_states,
            }),
        );
        state.set_updated_at();
        Ok(())
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod analysis_tests;
