//! Failure classification for external service calls.
//!
//! Both the suggestion service and the evaluation service are opaque
//! collaborators; when a call fails all we have is an error message. The
//! classification here drives retry hints surfaced to the user.

use serde::{Deserialize, Serialize};

/// Canonical failure types for service-call failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The call did not resolve within the configured upper bound.
    Timeout,
    /// Network-related error detected from message patterns.
    Network,
    /// The service answered but the response carried no usable content.
    EmptyResponse,
    /// The response violated the service contract (wrong length, wrong id).
    Protocol,
    /// Unclassified errors for future extensibility.
    Unknown,
}

impl FailureKind {
    /// Classifies an error message into a failure kind based on message
    /// patterns.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") || lower.contains("no response")
        {
            return FailureKind::Timeout;
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("unreachable")
            || lower.contains("refused")
            || lower.contains("reset")
        {
            return FailureKind::Network;
        }

        if lower.contains("empty response")
            || lower.contains("empty output")
            || lower.contains("no content")
        {
            return FailureKind::EmptyResponse;
        }

        FailureKind::Unknown
    }

    /// Returns true if this failure type is potentially recoverable via retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::Network | FailureKind::EmptyResponse
        )
    }

    /// Returns a human-readable name for this failure type.
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Timeout",
            FailureKind::Network => "Network",
            FailureKind::EmptyResponse => "Empty Response",
            FailureKind::Protocol => "Protocol",
            FailureKind::Unknown => "Unknown",
        }
    }
}
