// Data model shared across the workflow engine and the HTTP layer

mod session;
mod stage;

pub use session::{PlanTask, WorkflowSession};
pub use stage::{can_transition, transition_stage, StageTransitionError, WorkflowStage};
