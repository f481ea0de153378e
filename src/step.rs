//! The six ordered stages of the guided problem-solving method.

use serde::{Deserialize, Serialize};

/// One of the six sequential stages. Ordering is total: a stage only reads
/// slots committed by earlier stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepIndex {
    Understanding,
    Goal,
    Analysis,
    Contradiction,
    Ideation,
    Evaluation,
}

impl StepIndex {
    /// All stages in method order.
    pub const ALL: [StepIndex; 6] = [
        StepIndex::Understanding,
        StepIndex::Goal,
        StepIndex::Analysis,
        StepIndex::Contradiction,
        StepIndex::Ideation,
        StepIndex::Evaluation,
    ];

    /// 1-based stage number as shown to users.
    pub fn number(self) -> u8 {
        match self {
            StepIndex::Understanding => 1,
            StepIndex::Goal => 2,
            StepIndex::Analysis => 3,
            StepIndex::Contradiction => 4,
            StepIndex::Ideation => 5,
            StepIndex::Evaluation => 6,
        }
    }

    /// Inverse of [`StepIndex::number`].
    pub fn from_number(n: u8) -> Option<Self> {
        StepIndex::ALL.into_iter().find(|step| step.number() == n)
    }

    /// The stage that control passes to after this one commits.
    pub fn next(self) -> Option<Self> {
        StepIndex::from_number(self.number() + 1)
    }

    /// Full label for verbose display.
    pub fn label(self) -> &'static str {
        match self {
            StepIndex::Understanding => "Understanding the Problem",
            StepIndex::Goal => "Goal Definition",
            StepIndex::Analysis => "System Analysis",
            StepIndex::Contradiction => "Contradiction Formulation",
            StepIndex::Ideation => "Idea Generation",
            StepIndex::Evaluation => "Idea Evaluation",
        }
    }

    /// Short label for compact display (e.g., status bars).
    pub fn short(self) -> &'static str {
        match self {
            StepIndex::Understanding => "Understand",
            StepIndex::Goal => "Goal",
            StepIndex::Analysis => "Analyze",
            StepIndex::Contradiction => "Contradict",
            StepIndex::Ideation => "Ideate",
            StepIndex::Evaluation => "Evaluate",
        }
    }
}

impl std::fmt::Display for StepIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ({})", self.number(), self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_round_trip() {
        for step in StepIndex::ALL {
            assert_eq!(StepIndex::from_number(step.number()), Some(step));
        }
        assert_eq!(StepIndex::from_number(0), None);
        assert_eq!(StepIndex::from_number(7), None);
    }

    #[test]
    fn test_next_walks_the_full_method() {
        let mut step = StepIndex::Understanding;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited, StepIndex::ALL);
        assert_eq!(StepIndex::Evaluation.next(), None);
    }

    #[test]
    fn test_display_uses_stage_number() {
        assert_eq!(StepIndex::Ideation.to_string(), "step 5 (Ideate)");
    }
}
