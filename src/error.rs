// Workflow-level error taxonomy
//
// Every external call is wrapped; a failed call surfaces its message
// verbatim and leaves the session stage unchanged. There are no automatic
// retries anywhere in this crate.

use thiserror::Error;

use crate::models::StageTransitionError;
use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Stage(#[from] StageTransitionError),

    #[error("research target must not be empty")]
    EmptyTarget,

    #[error("no plan has been generated yet")]
    MissingPlan,

    #[error("at least one task must be selected")]
    NoTasksSelected,

    #[error("no research record to analyze")]
    MissingResearch,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("deep research interaction {id} failed: {message}")]
    ResearchFailed { id: String, message: String },

    #[error("interaction {id} still in progress after {waited_secs}s")]
    PollTimeout { id: String, waited_secs: u64 },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
