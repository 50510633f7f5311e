// Side-effecting tool bindings for analysis pipeline stages
//
// A tool consumes the text its stage produced and writes an artifact.
// Tool failures never abort the pipeline; they come back as non-success
// outcomes and surface as warnings on the session.

mod chart;
mod infographic;
mod report;

pub use chart::FinancialChartTool;
pub use infographic::InfographicTool;
pub use report::HtmlReportTool;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::provider::InteractionClient;

/// Shared resources handed to every tool invocation
#[derive(Clone)]
pub struct ToolContext {
    pub artifacts: Arc<ArtifactStore>,
    pub client: Arc<dyn InteractionClient>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Partial,
    Error,
}

/// Result of one tool invocation: a status plus either an artifact name
/// or a message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    pub tool: String,
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ToolOutcome {
    pub fn success(tool: &str, artifact: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            status: ToolStatus::Success,
            artifact: Some(artifact.into()),
            message: None,
        }
    }

    pub fn partial(tool: &str, message: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            status: ToolStatus::Partial,
            artifact: None,
            message: Some(message.into()),
        }
    }

    pub fn error(tool: &str, message: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            status: ToolStatus::Error,
            artifact: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

/// One side-effecting capability a pipeline stage can be bound to
#[async_trait]
pub trait AnalysisTool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the tool against its stage's output text
    async fn run(&self, stage_output: &str, ctx: &ToolContext) -> ToolOutcome;
}
