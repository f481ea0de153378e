//! Concrete controllers for stages 1-5. Stage 6 lives in the pipeline.

pub mod analysis;
pub mod contradiction;
pub mod goal;
pub mod ideation;
pub mod understanding;

pub use analysis::AnalysisController;
pub use contradiction::ContradictionController;
pub use goal::GoalController;
pub use ideation::IdeationController;
pub use understanding::UnderstandingController;
