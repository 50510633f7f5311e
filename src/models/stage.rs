// Workflow stage state machine with validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageTransitionError {
    #[error("Invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: WorkflowStage,
        to: WorkflowStage,
    },
}

/// Stage of the plan -> research -> analysis workflow.
///
/// `Idle` is the authenticated-but-empty state; each stage is reached by
/// exactly one user action and reverted only by a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Idle,
    Planned,
    Researched,
    Analyzed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Idle => "idle",
            WorkflowStage::Planned => "planned",
            WorkflowStage::Researched => "researched",
            WorkflowStage::Analyzed => "analyzed",
        }
    }
}

impl Default for WorkflowStage {
    fn default() -> Self {
        WorkflowStage::Idle
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validates if a session can transition from one stage to another
pub fn can_transition(from: WorkflowStage, to: WorkflowStage) -> bool {
    match (from, to) {
        // Planning is available from idle and may be re-run to replace a plan
        (WorkflowStage::Idle, WorkflowStage::Planned) => true,
        (WorkflowStage::Planned, WorkflowStage::Planned) => true,

        // Research requires a plan
        (WorkflowStage::Planned, WorkflowStage::Researched) => true,

        // Analysis requires research
        (WorkflowStage::Researched, WorkflowStage::Analyzed) => true,

        // Reset is valid from any stage
        (_, WorkflowStage::Idle) => true,

        // All other transitions are invalid
        _ => false,
    }
}

/// Validates and performs a stage transition
pub fn transition_stage(
    current: WorkflowStage,
    target: WorkflowStage,
) -> Result<WorkflowStage, StageTransitionError> {
    if !can_transition(current, target) {
        return Err(StageTransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    Ok(target)
}
