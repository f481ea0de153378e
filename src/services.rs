//! Contracts for the external AI collaborators.
//!
//! The suggestion service exposes one endpoint per stage 1-5; its request is
//! the concatenation of the upstream committed slots, its response the
//! stage-specific fields a controller turns into an editable draft. The
//! evaluation service scores ideas against the selected contradiction; the
//! pipeline always sends a singleton idea list.
//!
//! Implementations are out of scope here; tests use scripted services.

use crate::model::{
    AnalysisPayload, ContradictionPayload, Evaluation, GoalPayload, Idea, Principle,
    SystemContext, UnderstandingPayload,
};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingRequest {
    pub problem_statement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderstandingSuggestion {
    pub understanding: String,
    pub understanding_summary: String,
    pub system_context: SystemContext,
    pub psychological_inertia: Vec<String>,
    pub mini_problems: Vec<String>,
    pub clarification_needed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub problem_statement: String,
    pub understanding: UnderstandingPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSuggestion {
    pub goal: String,
    pub constraints: Vec<String>,
    pub scope: String,
    pub ideal_final_result: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub problem_statement: String,
    pub understanding: UnderstandingPayload,
    pub goal: GoalPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSuggestion {
    pub system_identified: String,
    pub elements: Vec<String>,
    pub required_states: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContradictionRequest {
    pub problem_statement: String,
    pub understanding: UnderstandingPayload,
    pub goal: GoalPayload,
    pub analysis: AnalysisPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContradictionSuggestion {
    pub contradictions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeationRequest {
    pub problem_statement: String,
    pub goal: GoalPayload,
    pub analysis: AnalysisPayload,
    pub contradiction: ContradictionPayload,
}

/// An idea as proposed by the service, before stage 5 assigns identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSuggestion {
    pub idea_statement: String,
    pub principle_used: Principle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeationSuggestion {
    pub ideas: Vec<IdeaSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub target_ml: String,
    pub ideas: Vec<Idea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub evaluated_ideas: Vec<Evaluation>,
}

/// Per-stage suggestion endpoints for stages 1-5.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest_understanding(
        &self,
        request: &UnderstandingRequest,
    ) -> Result<UnderstandingSuggestion>;

    async fn suggest_goal(&self, request: &GoalRequest) -> Result<GoalSuggestion>;

    async fn suggest_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisSuggestion>;

    async fn suggest_contradiction(
        &self,
        request: &ContradictionRequest,
    ) -> Result<ContradictionSuggestion>;

    async fn suggest_ideation(&self, request: &IdeationRequest) -> Result<IdeationSuggestion>;
}

/// Idea scoring endpoint for stage 6. The pipeline sends exactly one idea per
/// call and expects exactly one evaluation back.
#[async_trait]
pub trait EvaluationService: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::idea;

    #[test]
    fn test_evaluation_request_wire_shape() {
        let request = EvaluationRequest {
            target_ml: "flow must rise without raising pump power".to_string(),
            ideas: vec![idea(7, "pulse the pump")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetMl"], "flow must rise without raising pump power");
        assert_eq!(json["ideas"][0]["ideaStatement"], "pulse the pump");
        assert_eq!(json["ideas"][0]["principleUsed"]["name"], "Segmentation");
    }

    #[test]
    fn test_analysis_suggestion_parses_record_of_lists() {
        let json = r#"{
            "systemIdentified": "coolant loop",
            "elements": ["pump"],
            "requiredStates": {"pump": ["delivers full flow"]}
        }"#;
        let suggestion: AnalysisSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(
            suggestion.required_states["pump"],
            vec!["delivers full flow".to_string()]
        );
    }
}
