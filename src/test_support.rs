//! Shared fixtures for unit tests: canned payloads and scripted services.

use crate::model::{
    AnalysisPayload, ContradictionPayload, Evaluation, EvaluationPayload, EvaluationStatus,
    GoalPayload, Idea, IdeaAnalysis, IdeaId, IdeationPayload, ListItem, Principle, StepPayload,
    SystemContext, UnderstandingPayload,
};
use crate::services::{
    AnalysisRequest, AnalysisSuggestion, ContradictionRequest, ContradictionSuggestion,
    GoalRequest, GoalSuggestion, IdeaSuggestion, IdeationRequest, IdeationSuggestion,
    SuggestionService, UnderstandingRequest, UnderstandingSuggestion,
};
use crate::step::StepIndex;
use crate::store::WorkflowState;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub(crate) fn idea(id: IdeaId, statement: &str) -> Idea {
    Idea {
        id,
        idea_statement: statement.to_string(),
        principle_used: Principle {
            name: "Segmentation".to_string(),
        },
    }
}

pub(crate) fn resolved(id: IdeaId, status: EvaluationStatus) -> Evaluation {
    Evaluation {
        idea_id: id,
        status,
        analysis: IdeaAnalysis {
            screening: "passes screening".to_string(),
            resources_and_inertia: "uses on-hand resources".to_string(),
            overall_benefit: "net positive".to_string(),
        },
        decision_message: format!("decision for idea {}", id),
        action_suggestion: format!("action for idea {}", id),
        user_comment: None,
        user_rating: None,
    }
}

pub(crate) fn understanding_payload() -> UnderstandingPayload {
    let mini = ListItem::new("coolant overheats at peak load");
    UnderstandingPayload {
        understanding: "The cooling loop saturates under sustained peak load".to_string(),
        understanding_summary: "Cooling loop saturates".to_string(),
        system_context: SystemContext {
            main_object: "coolant loop".to_string(),
            environment: "sealed server enclosure".to_string(),
        },
        psychological_inertia: vec!["assume a bigger pump is required".to_string()],
        selected_mini_problem: mini.id.clone(),
        mini_problems: vec![mini],
        clarification_needed: None,
    }
}

pub(crate) fn goal_payload() -> GoalPayload {
    GoalPayload {
        goal: "Keep coolant below 60C at peak load".to_string(),
        constraints: vec![ListItem::new("no extra enclosure volume")],
        scope: "the existing sealed enclosure".to_string(),
        ideal_final_result: Some("the loop cools itself with no added parts".to_string()),
    }
}

pub(crate) fn analysis_payload() -> AnalysisPayload {
    let mut required_states = BTreeMap::new();
    required_states.insert(
        "pump".to_string(),
        vec![ListItem::new("delivers full flow at peak load")],
    );
    required_states.insert(
        "radiator".to_string(),
        vec![ListItem::new("sheds heat faster than intake")],
    );
    AnalysisPayload {
        system_identified: "forced-convection coolant loop".to_string(),
        elements: vec!["pump".to_string(), "radiator".to_string()],
        required_states,
    }
}

pub(crate) fn contradiction_payload() -> ContradictionPayload {
    let selected = ListItem::new("flow must rise without raising pump power");
    ContradictionPayload {
        selected_contradiction: selected.id.clone(),
        target_ml: selected.text.clone(),
        contradictions: vec![selected, ListItem::new("radiator must grow without growing")],
    }
}

pub(crate) fn ideation_payload(ideas: Vec<Idea>) -> IdeationPayload {
    IdeationPayload {
        selected_ideas: ideas.clone(),
        ideas,
        target_ml: "flow must rise without raising pump power".to_string(),
    }
}

/// Builds a session with every slot up to and including `through` committed.
pub(crate) fn state_through(through: StepIndex) -> WorkflowState {
    let mut state = WorkflowState::new("server cooling fails at peak load");
    for step in StepIndex::ALL {
        if step > through {
            break;
        }
        let payload = match step {
            StepIndex::Understanding => StepPayload::Understanding(understanding_payload()),
            StepIndex::Goal => StepPayload::Goal(goal_payload()),
            StepIndex::Analysis => StepPayload::Analysis(analysis_payload()),
            StepIndex::Contradiction => StepPayload::Contradiction(contradiction_payload()),
            StepIndex::Ideation => {
                StepPayload::Ideation(ideation_payload(vec![idea(1, "pulse the pump")]))
            }
            StepIndex::Evaluation => StepPayload::Evaluation(EvaluationPayload::default()),
        };
        state.store.set(step, payload);
    }
    state
}

/// Suggestion service returning canned stage suggestions and recording which
/// endpoints were hit, in order.
#[derive(Default)]
pub(crate) struct ScriptedSuggestions {
    pub calls: Mutex<Vec<&'static str>>,
}

impl ScriptedSuggestions {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SuggestionService for ScriptedSuggestions {
    async fn suggest_understanding(
        &self,
        _request: &UnderstandingRequest,
    ) -> Result<UnderstandingSuggestion> {
        self.calls.lock().unwrap().push("understanding");
        Ok(UnderstandingSuggestion {
            understanding: "The cooling loop saturates under sustained peak load".to_string(),
            understanding_summary: "Cooling loop saturates".to_string(),
            system_context: SystemContext {
                main_object: "coolant loop".to_string(),
                environment: "sealed server enclosure".to_string(),
            },
            psychological_inertia: vec!["assume a bigger pump is required".to_string()],
            mini_problems: vec![
                "coolant overheats at peak load".to_string(),
                "pump cavitates above 80% duty".to_string(),
            ],
            clarification_needed: None,
        })
    }

    async fn suggest_goal(&self, _request: &GoalRequest) -> Result<GoalSuggestion> {
        self.calls.lock().unwrap().push("goal");
        Ok(GoalSuggestion {
            goal: "Keep coolant below 60C at peak load".to_string(),
            constraints: vec!["no extra enclosure volume".to_string()],
            scope: "the existing sealed enclosure".to_string(),
            ideal_final_result: Some("the loop cools itself with no added parts".to_string()),
        })
    }

    async fn suggest_analysis(&self, _request: &AnalysisRequest) -> Result<AnalysisSuggestion> {
        self.calls.lock().unwrap().push("analysis");
        let mut required_states = BTreeMap::new();
        required_states.insert(
            "pump".to_string(),
            vec!["delivers full flow at peak load".to_string()],
        );
        // Leave "radiator" without states so controllers must backfill the key.
        Ok(AnalysisSuggestion {
            system_identified: "forced-convection coolant loop".to_string(),
            elements: vec!["pump".to_string(), "radiator".to_string()],
            required_states,
        })
    }

    async fn suggest_contradiction(
        &self,
        _request: &ContradictionRequest,
    ) -> Result<ContradictionSuggestion> {
        self.calls.lock().unwrap().push("contradiction");
        Ok(ContradictionSuggestion {
            contradictions: vec![
                "flow must rise without raising pump power".to_string(),
                "radiator must grow without growing".to_string(),
            ],
        })
    }

    async fn suggest_ideation(&self, _request: &IdeationRequest) -> Result<IdeationSuggestion> {
        self.calls.lock().unwrap().push("ideation");
        Ok(IdeationSuggestion {
            ideas: vec![
                IdeaSuggestion {
                    idea_statement: "pulse the pump instead of running it flat out".to_string(),
                    principle_used: Principle {
                        name: "Periodic Action".to_string(),
                    },
                },
                IdeaSuggestion {
                    idea_statement: "use the enclosure wall as a radiator".to_string(),
                    principle_used: Principle {
                        name: "Use of Resources".to_string(),
                    },
                },
            ],
        })
    }
}

/// Suggestion service whose every endpoint fails with a network-style error.
pub(crate) struct FailingSuggestions;

#[async_trait]
impl SuggestionService for FailingSuggestions {
    async fn suggest_understanding(
        &self,
        _request: &UnderstandingRequest,
    ) -> Result<UnderstandingSuggestion> {
        bail!("connection reset by peer")
    }

    async fn suggest_goal(&self, _request: &GoalRequest) -> Result<GoalSuggestion> {
        bail!("connection reset by peer")
    }

    async fn suggest_analysis(&self, _request: &AnalysisRequest) -> Result<AnalysisSuggestion> {
        bail!("connection reset by peer")
    }

    async fn suggest_contradiction(
        &self,
        _request: &ContradictionRequest,
    ) -> Result<ContradictionSuggestion> {
        bail!("connection reset by peer")
    }

    async fn suggest_ideation(&self, _request: &IdeationRequest) -> Result<IdeationSuggestion> {
        bail!("connection reset by peer")
    }
}
