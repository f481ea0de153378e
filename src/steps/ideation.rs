//! Stage 5: generate candidate ideas from inventive principles and pick the
//! subset that the evaluation pipeline will score.

use crate::config::WorkflowConfig;
use crate::controller::{call_bounded, missing_upstream, suggestion_error, StepController};
use crate::error::WorkflowError;
use crate::fingerprint::context_fingerprint;
use crate::model::{Idea, IdeaId, IdeationPayload, Principle, StepPayload};
use crate::services::{IdeationRequest, IdeationSuggestion, SuggestionService};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use async_trait::async_trait;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeationDraft {
    ideas: Vec<Idea>,
    selected: BTreeSet<IdeaId>,
    /// Read-only evaluation target inherited from stage 4.
    pub target_ml: String,
}

impl IdeationDraft {
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn is_selected(&self, id: IdeaId) -> bool {
        self.selected.contains(&id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdeationController {
    draft: Option<IdeationDraft>,
    fingerprint: Option<u64>,
}

impl IdeationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&IdeationDraft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut IdeationDraft, WorkflowError> {
        self.draft
            .as_mut()
            .ok_or_else(|| WorkflowError::validation("fetch a suggestion before editing stage 5"))
    }

    /// Adds a user-authored idea; ids continue the generated sequence.
    pub fn add_idea(
        &mut self,
        statement: impl Into<String>,
        principle: impl Into<String>,
    ) -> Result<IdeaId, WorkflowError> {
        let draft = self.draft_mut()?;
        let id = draft.ideas.iter().map(|idea| idea.id).max().unwrap_or(0) + 1;
        draft.ideas.push(Idea {
            id,
            idea_statement: statement.into(),
            principle_used: Principle {
                name: principle.into(),
            },
        });
        Ok(id)
    }

    pub fn select_idea(&mut self, id: IdeaId) -> Result<(), WorkflowError> {
        let draft = self.draft_mut()?;
        if !draft.ideas.iter().any(|idea| idea.id == id) {
            return Err(WorkflowError::validation(format!("no idea with id {}", id)));
        }
        draft.selected.insert(id);
        Ok(())
    }

    pub fn deselect_idea(&mut self, id: IdeaId) -> Result<(), WorkflowError> {
        self.draft_mut()?.selected.remove(&id);
        Ok(())
    }

    fn apply_suggestion(&mut self, suggestion: IdeationSuggestion, target_ml: String) {
        let ideas = suggestion
            .ideas
            .into_iter()
            .zip(1u64..)
            .map(|(idea, id)| Idea {
                id,
                idea_statement: idea.idea_statement,
                principle_used: idea.principle_used,
            })
            .collect();
        // A changed upstream context invalidates previous ideas wholesale:
        // idea identity is only meaningful within one generation run.
        self.draft = Some(IdeationDraft {
            ideas,
            selected: BTreeSet::new(),
            target_ml,
        });
    }
}

#[async_trait]
impl StepController for IdeationController {
    fn step(&self) -> StepIndex {
        StepIndex::Ideation
    }

    async fn suggest(
        &mut self,
        state: &WorkflowState,
        service: &dyn SuggestionService,
        config: &WorkflowConfig,
    ) -> Result<(), WorkflowError> {
        let goal = state
            .store
            .goal()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Goal))?;
        let analysis = state
            .store
            .analysis()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Analysis))?;
        let contradiction = state
            .store
            .contradiction()
            .ok_or_else(|| missing_upstream(self.step(), StepIndex::Contradiction))?;
        let request = IdeationRequest {
            problem_statement: state.problem_statement.clone(),
            goal: goal.clone(),
            analysis: analysis.clone(),
            contradiction: contradiction.clone(),
        };
        let fingerprint = context_fingerprint(&request)
            .map_err(|err| WorkflowError::validation(err.to_string()))?;
        if self.draft.is_some() && self.fingerprint == Some(fingerprint) {
            return Ok(());
        }

        let target_ml = contradiction.target_ml.clone();
        let suggestion = call_bounded(
            config.suggestion_timeout(),
            service.suggest_ideation(&request),
        )
        .await
        .map_err(|failure| suggestion_error(self.step(), failure))?;

        self.apply_suggestion(suggestion, target_ml);
        self.fingerprint = Some(fingerprint);
        Ok(())
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or_else(|| WorkflowError::validation("stage 5 has no draft to commit"))?;
        if draft.selected.is_empty() {
            return Err(WorkflowError::validation(
                "select at least one idea to evaluate",
            ));
        }
        Ok(())
    }

    fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        self.validate()?;
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| WorkflowError::validation("stage 5 has no draft to commit"))?;
        let selected_ideas = draft
            .ideas
            .iter()
            .filter(|idea| draft.selected.contains(&idea.id))
            .cloned()
            .collect();
        state.store.set(
            StepIndex::Ideation,
            StepPayload::Ideation(IdeationPayload {
                ideas: draft.ideas,
                selected_ideas,
                target_ml: draft.target_ml,
            }),
        );
        state.set_updated_at();
        Ok(())
    }
}

#[cfg(test)]
#[path = "ideation_tests.rs"]
mod ideation_tests;
