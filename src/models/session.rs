// Workflow session entity
//
// Sessions live server-side in an in-memory store; every handler reads the
// session at the top of the request and writes the mutated copy back before
// responding, so the full workflow state is always reproducible from the
// store alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkflowStage;

/// One task from the generated research plan.
///
/// Numbers are carried verbatim as strings (never renumbered) and tasks
/// keep the order they appeared in the plan text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTask {
    pub number: String,
    pub description: String,
    /// Tasks start selected, mirroring a checked-by-default checklist
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_selected() -> bool {
    true
}

impl PlanTask {
    pub fn new(number: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            description: description.into(),
            selected: true,
        }
    }

    /// Render the task the way it is fed to the research agent
    pub fn as_line(&self) -> String {
        format!("{}. {}", self.number, self.description)
    }
}

/// Server-side state for one user's plan -> research -> analysis workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSession {
    pub id: Uuid,
    pub stage: WorkflowStage,
    /// Interaction handle from the planning call, used to chain the
    /// deep-research call to the plan context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_interaction_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_text: Option<String>,
    /// How many tasks were selected when research ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_task_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_memo: Option<String>,
    /// Soft warning from the last action (degenerate result, tool failure).
    /// Warnings do not advance the stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            stage: WorkflowStage::Idle,
            plan_interaction_id: None,
            tasks: Vec::new(),
            research_text: None,
            selected_task_count: None,
            final_memo: None,
            warning: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Tasks currently ticked for research
    pub fn selected_tasks(&self) -> Vec<&PlanTask> {
        self.tasks.iter().filter(|t| t.selected).collect()
    }

    /// Clear all workflow fields and return to the idle stage.
    ///
    /// Authentication is handled at the server layer and survives a reset;
    /// only the workflow record itself is wiped.
    pub fn reset(&mut self) {
        self.stage = WorkflowStage::Idle;
        self.plan_interaction_id = None;
        self.tasks.clear();
        self.research_text = None;
        self.selected_task_count = None;
        self.final_memo = None;
        self.warning = None;
        self.touch();
    }

    /// Bump the updated-at timestamp after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = WorkflowSession::new();
        assert_eq!(session.stage, WorkflowStage::Idle);
        assert!(session.tasks.is_empty());
        assert!(session.plan_interaction_id.is_none());
        assert!(session.research_text.is_none());
        assert!(session.final_memo.is_none());
    }

    #[test]
    fn test_selected_tasks_filters_unselected() {
        let mut session = WorkflowSession::new();
        session.tasks = vec![
            PlanTask::new("1", "Find founders"),
            PlanTask::new("2", "Analyze market"),
        ];
        session.tasks[1].selected = false;

        let selected = session.selected_tasks();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].number, "1");
    }

    #[test]
    fn test_reset_clears_workflow_fields() {
        let mut session = WorkflowSession::new();
        session.stage = WorkflowStage::Analyzed;
        session.plan_interaction_id = Some("int-123".to_string());
        session.tasks = vec![PlanTask::new("1", "Find founders")];
        session.research_text = Some("evidence".to_string());
        session.selected_task_count = Some(1);
        session.final_memo = Some("memo".to_string());
        session.warning = Some("short result".to_string());

        session.reset();

        assert_eq!(session.stage, WorkflowStage::Idle);
        assert!(session.plan_interaction_id.is_none());
        assert!(session.tasks.is_empty());
        assert!(session.research_text.is_none());
        assert!(session.selected_task_count.is_none());
        assert!(session.final_memo.is_none());
        assert!(session.warning.is_none());
    }

    #[test]
    fn test_task_line_format() {
        let task = PlanTask::new("3", "Check financials");
        assert_eq!(task.as_line(), "3. Check financials");
    }
}
