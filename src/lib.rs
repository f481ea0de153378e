//! Core of a guided six-stage TRIZ-style problem-solving session.
//!
//! Each stage produces a typed payload that later stages consume as context.
//! Stage payloads are pre-filled by an external AI suggestion service and
//! edited by the user before the stage commits. Stage 6 runs a strictly
//! sequential idea-evaluation pipeline with single-flight dispatch, rollback
//! on failure, and completion/outcome gating.
//!
//! The crate is UI-agnostic: it exposes controllers and a pipeline that a
//! frontend drives, and it never blocks progression by panicking. Validation
//! failures are returned as user-facing messages.

pub mod config;
pub mod controller;
pub mod error;
pub mod event_log;
pub mod failure;
pub mod fingerprint;
pub mod model;
pub mod pipeline;
pub mod services;
pub mod session_paths;
pub mod snapshot;
pub mod step;
pub mod steps;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::WorkflowConfig;
pub use controller::{EditableList, StepController};
pub use error::WorkflowError;
pub use failure::FailureKind;
pub use model::{
    Evaluation, EvaluationStatus, Idea, IdeaAnalysis, IdeaId, ListItem, Principle, StepPayload,
};
pub use pipeline::{DispatchOutcome, EntryState, EvaluationPipeline};
pub use services::{EvaluationService, SuggestionService};
pub use step::StepIndex;
pub use store::{WorkflowState, WorkflowStore};
