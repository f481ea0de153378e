//! Typed payloads for the six stages and the domain records they carry.
//!
//! Pure data: no behavior beyond constructors. Field names follow the wire
//! format of the external services (camelCase on the wire).

use crate::step::StepIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identity of an idea within a session. Ideas are assigned ids by stage 5
/// and are immutable afterwards.
pub type IdeaId = u64;

/// One element of a user-editable list (mini-problems, constraints,
/// required states, contradictions). The id stays stable across edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub text: String,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}

/// The object/environment framing captured in stage 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    pub main_object: String,
    pub environment: String,
}

/// Stage 1: problem understanding and mini-problem selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingPayload {
    pub understanding: String,
    pub understanding_summary: String,
    pub system_context: SystemContext,
    pub psychological_inertia: Vec<String>,
    pub mini_problems: Vec<ListItem>,
    /// Id of the mini-problem chosen from `mini_problems`.
    pub selected_mini_problem: String,
    pub clarification_needed: Option<Vec<String>>,
}

/// Stage 2: goal, constraints, and read-only framing context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPayload {
    pub goal: String,
    pub constraints: Vec<ListItem>,
    pub scope: String,
    pub ideal_final_result: Option<String>,
}

/// Stage 3: the analyzed system and the required state of each element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    pub system_identified: String,
    pub elements: Vec<String>,
    pub required_states: BTreeMap<String, Vec<ListItem>>,
}

/// Stage 4: candidate contradictions and the one selected as the evaluation
/// target for stage 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContradictionPayload {
    pub contradictions: Vec<ListItem>,
    /// Id of the contradiction chosen from `contradictions`.
    pub selected_contradiction: String,
    /// The selected contradiction statement; carried forward verbatim as the
    /// scoring target of idea evaluation.
    pub target_ml: String,
}

/// The inventive principle an idea was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub name: String,
}

/// A candidate solution generated in stage 5. Immutable; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: IdeaId,
    pub idea_statement: String,
    pub principle_used: Principle,
}

/// Stage 5: generated ideas and the subset selected for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeationPayload {
    pub ideas: Vec<Idea>,
    pub selected_ideas: Vec<Idea>,
    pub target_ml: String,
}

/// Outcome classification for one evaluated idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    /// Recommended for implementation.
    Selected,
    /// Viable backup.
    Reserve,
    /// Screened out.
    Rejected,
}

/// The evaluation service's structured reasoning for one idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaAnalysis {
    pub screening: String,
    pub resources_and_inertia: String,
    pub overall_benefit: String,
}

/// A resolved evaluation for one idea.
///
/// `user_comment` and `user_rating` are orthogonal to `status`/`analysis`:
/// they are set by the user after resolution and never by the service.
/// In-flight tracking lives in the pipeline, not on this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub idea_id: IdeaId,
    pub status: EvaluationStatus,
    pub analysis: IdeaAnalysis,
    pub decision_message: String,
    pub action_suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
}

/// Stage 6: the deduplicated evaluation collection, keyed by idea identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPayload {
    pub evaluations: BTreeMap<IdeaId, Evaluation>,
}

/// A committed stage result. One variant per stage; the store holds at most
/// one payload per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum StepPayload {
    Understanding(UnderstandingPayload),
    Goal(GoalPayload),
    Analysis(AnalysisPayload),
    Contradiction(ContradictionPayload),
    Ideation(IdeationPayload),
    Evaluation(EvaluationPayload),
}

impl StepPayload {
    /// The stage this payload belongs to.
    pub fn step(&self) -> StepIndex {
        match self {
            StepPayload::Understanding(_) => StepIndex::Understanding,
            StepPayload::Goal(_) => StepIndex::Goal,
            StepPayload::Analysis(_) => StepIndex::Analysis,
            StepPayload::Contradiction(_) => StepIndex::Contradiction,
            StepPayload::Ideation(_) => StepIndex::Ideation,
            StepPayload::Evaluation(_) => StepIndex::Evaluation,
        }
    }
}
