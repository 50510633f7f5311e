// Infographic generation tool
//
// Delegates to the provider's image generation with the memo summary as
// the prompt. Providers without image support degrade to a partial
// outcome rather than failing the pipeline.

use async_trait::async_trait;

use crate::artifacts::ArtifactStore;

use super::{AnalysisTool, ToolContext, ToolOutcome};

const TOOL_NAME: &str = "generate_infographic";

/// Keep prompts bounded; image endpoints reject very long inputs
const MAX_PROMPT_CHARS: usize = 2000;

pub struct InfographicTool;

#[async_trait]
impl AnalysisTool for InfographicTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    async fn run(&self, stage_output: &str, ctx: &ToolContext) -> ToolOutcome {
        log::info!("Infographic tool triggered");

        let prompt: String = stage_output.chars().take(MAX_PROMPT_CHARS).collect();

        let bytes = match ctx.client.generate_image(&prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Image generation unavailable: {}", e);
                return ToolOutcome::partial(
                    TOOL_NAME,
                    format!("image generation unavailable: {}", e),
                );
            }
        };

        let name = ArtifactStore::infographic_name();
        match ctx.artifacts.save_bytes(&name, &bytes) {
            Ok(_) => ToolOutcome::success(TOOL_NAME, name),
            Err(e) => ToolOutcome::error(TOOL_NAME, e),
        }
    }
}
