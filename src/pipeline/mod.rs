// Sequential analysis pipeline
//
// Stages run strictly in order. Each stage renders its instruction from
// the research record plus the keyed outputs of every prior stage, makes
// one synchronous model call, then fires its tool binding (if any) on the
// extracted text. The pipeline's result is the last stage's text.

mod stages;

pub use stages::standard_stages;

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::parsers::extract_text;
use crate::provider::{InteractionClient, InteractionRequest};
use crate::server::EventBroadcaster;
use crate::tools::{AnalysisTool, ToolContext, ToolOutcome};

/// One named unit of the analysis sequence
pub struct PipelineStage {
    /// Key under which this stage's output is exposed to later stages
    pub key: &'static str,
    /// Display name for progress events
    pub name: &'static str,
    /// Model identifier for the stage's call
    pub model: String,
    /// Tera template; may reference `research` and `outputs.<key>`
    pub instruction: &'static str,
    /// Optional side-effecting tool fired on the stage output
    pub tool: Option<Arc<dyn AnalysisTool>>,
}

/// Everything a finished pipeline run produced
pub struct PipelineRun {
    /// Text of the last stage (the final memo)
    pub final_text: String,
    /// All stage outputs by key
    pub outputs: HashMap<String, String>,
    /// Outcomes of every tool invocation, in stage order
    pub tool_outcomes: Vec<ToolOutcome>,
}

pub struct AnalysisPipeline {
    stages: Vec<PipelineStage>,
    client: Arc<dyn InteractionClient>,
    tool_ctx: ToolContext,
    broadcaster: Arc<EventBroadcaster>,
}

impl AnalysisPipeline {
    pub fn new(
        stages: Vec<PipelineStage>,
        client: Arc<dyn InteractionClient>,
        tool_ctx: ToolContext,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Self {
        Self {
            stages,
            client,
            tool_ctx,
            broadcaster,
        }
    }

    /// Run all stages in sequence and return the accumulated result
    pub async fn run(&self, session_id: Uuid, research_text: &str) -> Result<PipelineRun> {
        let mut outputs: HashMap<String, String> = HashMap::new();
        let mut tool_outcomes = Vec::new();
        let mut final_text = String::new();
        let total = self.stages.len();

        for (position, stage) in self.stages.iter().enumerate() {
            log::info!(
                "Analysis stage {}/{}: {} ({})",
                position + 1,
                total,
                stage.name,
                stage.key
            );

            self.broadcaster.broadcast(
                "analysis:stage_started",
                json!({
                    "sessionId": session_id,
                    "stage": stage.key,
                    "name": stage.name,
                    "position": position + 1,
                    "total": total,
                }),
            );

            let instruction = render_instruction(stage.instruction, research_text, &outputs)?;

            let interaction = self
                .client
                .create_interaction(InteractionRequest::for_model(&stage.model, instruction))
                .await?;

            let text = extract_text(Some(&interaction.outputs));

            if let Some(tool) = &stage.tool {
                let outcome = tool.run(&text, &self.tool_ctx).await;

                self.broadcaster.broadcast(
                    "analysis:tool_finished",
                    json!({
                        "sessionId": session_id,
                        "stage": stage.key,
                        "outcome": outcome,
                    }),
                );

                if !outcome.is_success() {
                    log::warn!(
                        "Tool {} on stage {} did not succeed: {:?}",
                        tool.name(),
                        stage.key,
                        outcome.message
                    );
                }
                tool_outcomes.push(outcome);
            }

            self.broadcaster.broadcast(
                "analysis:stage_completed",
                json!({
                    "sessionId": session_id,
                    "stage": stage.key,
                    "chars": text.len(),
                }),
            );

            outputs.insert(stage.key.to_string(), text.clone());
            final_text = text;
        }

        Ok(PipelineRun {
            final_text,
            outputs,
            tool_outcomes,
        })
    }
}

/// Render a stage instruction against the research record and the keyed
/// outputs of the stages before it
fn render_instruction(
    template: &str,
    research_text: &str,
    outputs: &HashMap<String, String>,
) -> Result<String> {
    let mut context = Context::new();
    context.insert("research", research_text);
    context.insert("outputs", outputs);

    // Instructions are prompts, not markup; autoescape would mangle them
    Tera::one_off(template, &context, false).map_err(WorkflowError::Template)
}
