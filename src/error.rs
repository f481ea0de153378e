//! Error types for the workflow domain.

use crate::failure::FailureKind;
use crate::model::IdeaId;
use crate::step::StepIndex;
use std::fmt::{Display, Formatter};

/// Errors surfaced by stage controllers and the evaluation pipeline.
///
/// Every variant is recoverable: validation errors are corrected by the user,
/// service errors leave the pre-call state intact and are retried by
/// re-triggering the same operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Stage-specific rule violation. Never reaches the network; blocks the
    /// advance action until the user corrects the input.
    Validation { message: String },
    /// A stage's suggestion fetch failed. No partial payload was committed.
    Suggestion {
        step: StepIndex,
        kind: FailureKind,
        message: String,
    },
    /// A single idea's evaluation call failed and was rolled back. Resolved
    /// ideas are untouched and the cursor did not advance.
    Evaluation {
        idea_id: IdeaId,
        kind: FailureKind,
        message: String,
    },
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            message: message.into(),
        }
    }

    /// Returns true if re-triggering the failed operation is likely to help.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::Validation { .. } => false,
            WorkflowError::Suggestion { kind, .. } | WorkflowError::Evaluation { kind, .. } => {
                kind.is_retryable()
            }
        }
    }
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowError::Validation { message } => write!(f, "{}", message),
            WorkflowError::Suggestion {
                step,
                kind,
                message,
            } => write!(
                f,
                "suggestion fetch for {} failed ({}): {}",
                step,
                kind.display_name(),
                message
            ),
            WorkflowError::Evaluation {
                idea_id,
                kind,
                message,
            } => write!(
                f,
                "evaluation of idea {} failed ({}): {}",
                idea_id,
                kind.display_name(),
                message
            ),
        }
    }
}

impl std::error::Error for WorkflowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_never_retryable() {
        let err = WorkflowError::validation("a mini-problem must be selected");
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "a mini-problem must be selected");
    }

    #[test]
    fn test_service_errors_inherit_kind_retryability() {
        let err = WorkflowError::Evaluation {
            idea_id: 3,
            kind: FailureKind::Network,
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("idea 3"));

        let err = WorkflowError::Suggestion {
            step: StepIndex::Goal,
            kind: FailureKind::Unknown,
            message: "boom".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("step 2"));
    }
}
