//! Stage 6: the sequential idea evaluation pipeline.
//!
//! Evaluates the ideas selected in stage 5 one at a time, in selection order,
//! against the stage 4 target. At most one service call is ever in flight.
//! An idea that fails keeps the pipeline at its position: resolved entries
//! are untouched, nothing later is dispatched, and re-running resumes at the
//! failed idea. Already-resolved ideas are never re-dispatched, so re-running
//! a finished pipeline is a no-op.
//!
//! The in-flight marker lives on the pipeline, not on the evaluation records;
//! a record exists only once its idea is fully resolved.

use crate::config::WorkflowConfig;
use crate::controller::call_bounded;
use crate::error::WorkflowError;
use crate::event_log::EventLog;
use crate::failure::FailureKind;
use crate::model::{
    Evaluation, EvaluationPayload, EvaluationStatus, Idea, IdeaId, IdeationPayload, StepPayload,
};
use crate::services::{EvaluationRequest, EvaluationService};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The idea at the cursor was already resolved; the cursor advanced past
    /// it without a service call.
    Skipped(IdeaId),
    /// The idea at the cursor was evaluated and recorded.
    Resolved(IdeaId),
    /// Cancellation was requested; nothing was recorded.
    Cancelled,
    /// Every selected idea is resolved.
    Exhausted,
}

/// Display state of one selected idea, for rendering the evaluation list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryState<'a> {
    /// Not yet dispatched.
    Pending,
    /// Dispatched, awaiting the service response.
    InFlight,
    Resolved(&'a Evaluation),
}

pub struct EvaluationPipeline {
    target_ml: String,
    ideas: Vec<Idea>,
    evaluations: BTreeMap<IdeaId, Evaluation>,
    /// Position in `ideas` of the next idea to consider.
    cursor: usize,
    in_flight: Option<IdeaId>,
    timeout: Duration,
    cancel_rx: Option<watch::Receiver<bool>>,
    event_log: Option<Arc<EventLog>>,
}

#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum PipelineEvent {
    Dispatched { idea_id: IdeaId },
    Resolved { idea_id: IdeaId, status: EvaluationStatus },
    RolledBack { idea_id: IdeaId, failure: String },
    Discarded { idea_id: IdeaId },
    Committed { count: usize },
}

impl EvaluationPipeline {
    /// Builds a fresh pipeline over the stage 5 selection.
    pub fn new(ideation: &IdeationPayload, config: &WorkflowConfig) -> Self {
        Self {
            target_ml: ideation.target_ml.clone(),
            ideas: ideation.selected_ideas.clone(),
            evaluations: BTreeMap::new(),
            cursor: 0,
            in_flight: None,
            timeout: config.evaluation_timeout(),
            cancel_rx: None,
            event_log: None,
        }
    }

    /// Rebuilds a pipeline from a previously committed stage 6 payload, e.g.
    /// after restoring a snapshot. Evaluations for ideas no longer in the
    /// selection are dropped.
    pub fn resume(
        ideation: &IdeationPayload,
        committed: &EvaluationPayload,
        config: &WorkflowConfig,
    ) -> Self {
        let mut pipeline = Self::new(ideation, config);
        pipeline.evaluations = committed
            .evaluations
            .iter()
            .filter(|(id, _)| ideation.selected_ideas.iter().any(|idea| idea.id == **id))
            .map(|(id, evaluation)| (*id, evaluation.clone()))
            .collect();
        pipeline
    }

    /// Installs a cancellation flag. Flipping it to true (or dropping the
    /// sender) stops the pipeline before the next dispatch and discards any
    /// response still in flight.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn with_event_log(mut self, event_log: Arc<EventLog>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Dispatches the next unresolved idea, if any.
    ///
    /// On failure the pipeline is exactly as it was before the call: no
    /// record is written and the cursor stays on the failed idea, so calling
    /// again retries it.
    pub async fn evaluate_next(
        &mut self,
        service: &dyn EvaluationService,
    ) -> Result<DispatchOutcome, WorkflowError> {
        if let Some(idea_id) = self.in_flight {
            return Err(WorkflowError::validation(format!(
                "evaluation of idea {} is still in flight",
                idea_id
            )));
        }
        let Some(idea) = self.ideas.get(self.cursor).cloned() else {
            return Ok(DispatchOutcome::Exhausted);
        };
        if self.evaluations.contains_key(&idea.id) {
            self.cursor += 1;
            return Ok(DispatchOutcome::Skipped(idea.id));
        }
        if self.cancel_requested() {
            return Ok(DispatchOutcome::Cancelled);
        }

        self.in_flight = Some(idea.id);
        self.log_event(PipelineEvent::Dispatched { idea_id: idea.id });
        let request = EvaluationRequest {
            target_ml: self.target_ml.clone(),
            ideas: vec![idea.clone()],
        };
        let result = match self.cancel_rx.clone() {
            Some(mut cancel_rx) => {
                tokio::select! {
                    _ = cancel_rx.wait_for(|cancelled| *cancelled) => None,
                    result = call_bounded(self.timeout, service.evaluate(&request)) => Some(result),
                }
            }
            None => Some(call_bounded(self.timeout, service.evaluate(&request)).await),
        };

        let Some(result) = result else {
            // A response that races the cancellation is discarded unseen.
            self.in_flight = None;
            self.log_event(PipelineEvent::Discarded { idea_id: idea.id });
            return Ok(DispatchOutcome::Cancelled);
        };
        let response = match result {
            Ok(response) => response,
            Err((kind, message)) => {
                return Err(self.roll_back(idea.id, kind, message));
            }
        };
        let evaluation = match Self::extract_singleton(idea.id, response.evaluated_ideas) {
            Ok(evaluation) => evaluation,
            Err(message) => {
                return Err(self.roll_back(idea.id, FailureKind::Protocol, message));
            }
        };

        self.log_event(PipelineEvent::Resolved {
            idea_id: idea.id,
            status: evaluation.status,
        });
        self.evaluations.insert(idea.id, evaluation);
        self.in_flight = None;
        self.cursor += 1;
        Ok(DispatchOutcome::Resolved(idea.id))
    }

    /// Runs dispatches until the selection is exhausted, cancellation is
    /// requested, or one evaluation fails. Returns the terminal outcome;
    /// after an error, calling `run` again resumes at the failed idea.
    pub async fn run(
        &mut self,
        service: &dyn EvaluationService,
    ) -> Result<DispatchOutcome, WorkflowError> {
        loop {
            match self.evaluate_next(service).await? {
                DispatchOutcome::Skipped(_) | DispatchOutcome::Resolved(_) => {}
                outcome @ (DispatchOutcome::Cancelled | DispatchOutcome::Exhausted) => {
                    return Ok(outcome);
                }
            }
        }
    }

    /// True once every selected idea has a resolved evaluation and nothing
    /// is in flight.
    pub fn is_complete(&self) -> bool {
        self.in_flight.is_none()
            && self
                .ideas
                .iter()
                .all(|idea| self.evaluations.contains_key(&idea.id))
    }

    /// True when the session may advance past stage 6: evaluation is
    /// complete and at least one idea was marked SELECTED.
    pub fn can_proceed(&self) -> bool {
        self.is_complete()
            && self
                .evaluations
                .values()
                .any(|evaluation| evaluation.status == EvaluationStatus::Selected)
    }

    /// (resolved, total) over the selection, counting duplicates once.
    pub fn progress(&self) -> (usize, usize) {
        let total = self
            .ideas
            .iter()
            .map(|idea| idea.id)
            .collect::<BTreeSet<_>>()
            .len();
        (self.evaluations.len(), total)
    }

    pub fn entry_state(&self, idea_id: IdeaId) -> EntryState<'_> {
        if let Some(evaluation) = self.evaluations.get(&idea_id) {
            return EntryState::Resolved(evaluation);
        }
        if self.in_flight == Some(idea_id) {
            return EntryState::InFlight;
        }
        EntryState::Pending
    }

    /// Resolved evaluations in selection order.
    pub fn evaluations(&self) -> Vec<&Evaluation> {
        self.ideas
            .iter()
            .filter_map(|idea| self.evaluations.get(&idea.id))
            .collect()
    }

    /// Attaches the user's comment and rating to a resolved evaluation.
    /// An absent argument leaves the stored value untouched, so a
    /// rating-only update never clears an earlier comment. The
    /// service-provided fields are left untouched either way.
    pub fn set_user_feedback(
        &mut self,
        idea_id: IdeaId,
        comment: Option<&str>,
        rating: Option<u8>,
    ) -> Result<(), WorkflowError> {
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(WorkflowError::validation(format!(
                    "rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }
        let evaluation = self.evaluations.get_mut(&idea_id).ok_or_else(|| {
            WorkflowError::validation(format!(
                "idea {} has no resolved evaluation to comment on",
                idea_id
            ))
        })?;
        if let Some(comment) = comment {
            evaluation.user_comment = Some(comment.to_string());
        }
        if let Some(rating) = rating {
            evaluation.user_rating = Some(rating);
        }
        Ok(())
    }

    /// Writes the evaluation collection to the stage 6 slot. Blocked until
    /// every idea is resolved and at least one is SELECTED.
    pub fn commit(&self, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        if !self.is_complete() {
            let (resolved, total) = self.progress();
            return Err(WorkflowError::validation(format!(
                "evaluation is not finished ({} of {} ideas resolved)",
                resolved, total
            )));
        }
        if !self.can_proceed() {
            return Err(WorkflowError::validation(
                "mark at least one idea SELECTED before finishing the session",
            ));
        }
        self.log_event(PipelineEvent::Committed {
            count: self.evaluations.len(),
        });
        state.store.set(
            StepIndex::Evaluation,
            StepPayload::Evaluation(EvaluationPayload {
                evaluations: self.evaluations.clone(),
            }),
        );
        state.set_updated_at();
        Ok(())
    }

    /// Rolls the failed dispatch back to the pre-call state and builds the
    /// error to surface.
    fn roll_back(&mut self, idea_id: IdeaId, kind: FailureKind, message: String) -> WorkflowError {
        self.in_flight = None;
        self.log_event(PipelineEvent::RolledBack {
            idea_id,
            failure: kind.display_name().to_string(),
        });
        WorkflowError::Evaluation {
            idea_id,
            kind,
            message,
        }
    }

    /// The service must answer a singleton request with exactly the idea it
    /// was asked about; anything else is a protocol violation. User feedback
    /// fields are not the service's to set and are cleared.
    fn extract_singleton(
        idea_id: IdeaId,
        mut evaluated: Vec<Evaluation>,
    ) -> Result<Evaluation, String> {
        if evaluated.len() != 1 {
            return Err(format!(
                "expected 1 evaluated idea in the response, got {}",
                evaluated.len()
            ));
        }
        let mut evaluation = evaluated.remove(0);
        if evaluation.idea_id != idea_id {
            return Err(format!(
                "response is for idea {} but idea {} was sent",
                evaluation.idea_id, idea_id
            ));
        }
        evaluation.user_comment = None;
        evaluation.user_rating = None;
        Ok(evaluation)
    }

    fn cancel_requested(&self) -> bool {
        self.cancel_rx
            .as_ref()
            .is_some_and(|cancel_rx| *cancel_rx.borrow())
    }

    fn log_event(&self, event: PipelineEvent) {
        if let Some(event_log) = &self.event_log {
            event_log.log("pipeline", event);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
